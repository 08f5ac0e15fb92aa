use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppJson, AppPath, AppResult, AppState,
    auth::CallerIdentity,
    db::Post,
    permissions::{Ownership, ResourceKind, authorize},
    validate,
};

use super::fetch_post;

#[derive(Debug, Default, Deserialize)]
pub struct PostChanges {
    pub post_picture: Option<String>,
    pub description: Option<String>,
}

/// With `partial`, absent fields keep their value; otherwise they are cleared.
pub async fn update_post(
    db_pool: &SqlitePool,
    caller: &CallerIdentity,
    id: Uuid,
    changes: PostChanges,
    partial: bool,
) -> AppResult<Post> {
    let mut post = fetch_post(db_pool, id).await?;
    authorize(Some(caller), ResourceKind::Post, &Ownership::owned_by(post.profile_id))?;

    let (post_picture, description) = if partial {
        (
            changes.post_picture.or(post.post_picture),
            changes.description.or(post.description),
        )
    } else {
        (changes.post_picture, changes.description)
    };
    post.post_picture = validate::optional_text("post_picture", post_picture, None)?;
    post.description = validate::optional_text("description", description, None)?;
    post.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE posts SET post_picture=?,description=?,updated_at=? WHERE id=?")
        .bind(&post.post_picture)
        .bind(&post.description)
        .bind(post.updated_at)
        .bind(post.id)
        .execute(db_pool)
        .await?;

    info!(post_id = %post.id, "post updated");
    Ok(post)
}

/// Comments and likes on the post go with it.
pub async fn delete_post(db_pool: &SqlitePool, caller: &CallerIdentity, id: Uuid) -> AppResult<()> {
    let post = fetch_post(db_pool, id).await?;
    authorize(Some(caller), ResourceKind::Post, &Ownership::owned_by(post.profile_id))?;

    sqlx::query("DELETE FROM posts WHERE id=?")
        .bind(post.id)
        .execute(db_pool)
        .await?;

    info!(post_id = %post.id, "post deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn patch(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<PostChanges>,
) -> AppResult<Json<Post>> {
    Ok(Json(update_post(&db_pool, &caller, id, changes, true).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn replace(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<PostChanges>,
) -> AppResult<Json<Post>> {
    Ok(Json(update_post(&db_pool, &caller, id, changes, false).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete_post(&db_pool, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
