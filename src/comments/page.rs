use axum::{Json, debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppPath, AppResult, AppState, db::Comment};

use super::{fetch_comment, list_comments};

#[debug_handler(state = AppState)]
pub(crate) async fn comments(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(list_comments(&db_pool).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn comment(State(db_pool): State<SqlitePool>, AppPath(id): AppPath<Uuid>) -> AppResult<Json<Comment>> {
    Ok(Json(fetch_comment(&db_pool, id).await?.comment))
}
