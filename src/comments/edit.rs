use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppJson, AppPath, AppResult, AppState,
    auth::CallerIdentity,
    db::Comment,
    permissions::{ResourceKind, authorize},
    validate,
};

use super::fetch_comment;

/// Only the text of a comment can change; it stays on its post.
#[derive(Debug, Default, Deserialize)]
pub struct CommentChanges {
    pub comment: Option<String>,
}

/// Either the author or the owner of the post may edit or delete a comment.
pub async fn edit_comment(db_pool: &SqlitePool, caller: &CallerIdentity, id: Uuid, text: Option<String>) -> AppResult<Comment> {
    let owned = fetch_comment(db_pool, id).await?;
    authorize(Some(caller), ResourceKind::Comment, &owned.ownership())?;

    let mut comment = owned.comment;
    comment.comment = validate::comment(text)?;
    comment.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE comments SET comment=?,updated_at=? WHERE id=?")
        .bind(&comment.comment)
        .bind(comment.updated_at)
        .bind(comment.id)
        .execute(db_pool)
        .await?;

    info!(comment_id = %comment.id, by = %caller.profile_id, "comment edited");
    Ok(comment)
}

pub async fn delete_comment(db_pool: &SqlitePool, caller: &CallerIdentity, id: Uuid) -> AppResult<()> {
    let owned = fetch_comment(db_pool, id).await?;
    authorize(Some(caller), ResourceKind::Comment, &owned.ownership())?;

    sqlx::query("DELETE FROM comments WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;

    info!(comment_id = %id, by = %caller.profile_id, "comment deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn patch(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<CommentChanges>,
) -> AppResult<Json<Comment>> {
    let text = match changes.comment {
        Some(text) => Some(text),
        None => Some(fetch_comment(&db_pool, id).await?.comment.comment),
    };
    Ok(Json(edit_comment(&db_pool, &caller, id, text).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn replace(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<CommentChanges>,
) -> AppResult<Json<Comment>> {
    Ok(Json(edit_comment(&db_pool, &caller, id, changes.comment).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    delete_comment(&db_pool, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
