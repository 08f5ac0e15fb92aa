use axum::{Json, debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppPath, AppResult, AppState, db::Post};

use super::{fetch_post, list_posts};

#[debug_handler(state = AppState)]
pub(crate) async fn posts(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(list_posts(&db_pool).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn post(State(db_pool): State<SqlitePool>, AppPath(id): AppPath<Uuid>) -> AppResult<Json<Post>> {
    Ok(Json(fetch_post(&db_pool, id).await?))
}
