use axum::{Json, debug_handler, extract::State};
use sqlx::SqlitePool;

use crate::{AppPath, AppResult, AppState};

use super::{ProfileView, list_profiles, profile_by_username};

#[debug_handler(state = AppState)]
pub(crate) async fn profiles(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<ProfileView>>> {
    Ok(Json(list_profiles(&db_pool).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    AppPath(username): AppPath<String>,
) -> AppResult<Json<ProfileView>> {
    Ok(Json(profile_by_username(&db_pool, &username).await?))
}
