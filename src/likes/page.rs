use axum::{Json, debug_handler, extract::State, http::StatusCode};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppError, AppPath, AppResult, AppState,
    auth::CallerIdentity,
    db::Like,
    permissions::{Ownership, ResourceKind, authorize},
};

/// The caller's own likes, newest first.
pub async fn likes_of(db_pool: &SqlitePool, caller: &CallerIdentity) -> AppResult<Vec<Like>> {
    Ok(sqlx::query_as::<_, Like>("SELECT * FROM likes WHERE profile_id=? ORDER BY rowid DESC")
        .bind(caller.profile_id)
        .fetch_all(db_pool)
        .await?)
}

/// One of the caller's likes. Someone else's like is forbidden, not missing.
pub async fn like_of(db_pool: &SqlitePool, caller: &CallerIdentity, id: Uuid) -> AppResult<Like> {
    let like = fetch_like(db_pool, id).await?;
    authorize(Some(caller), ResourceKind::Like, &Ownership::owned_by(like.profile_id))?;
    Ok(like)
}

async fn fetch_like(db_pool: &SqlitePool, id: Uuid) -> AppResult<Like> {
    sqlx::query_as::<_, Like>("SELECT * FROM likes WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("Like"))
}

pub async fn delete_like(db_pool: &SqlitePool, caller: &CallerIdentity, id: Uuid) -> AppResult<()> {
    like_of(db_pool, caller, id).await?;

    sqlx::query("DELETE FROM likes WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;

    info!(like_id = %id, "like removed");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn likes(State(db_pool): State<SqlitePool>, caller: CallerIdentity) -> AppResult<Json<Vec<Like>>> {
    Ok(Json(likes_of(&db_pool, &caller).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn like(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Like>> {
    Ok(Json(like_of(&db_pool, &caller, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn unlike(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete_like(&db_pool, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
