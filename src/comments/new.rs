use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppError, AppJson, AppResult, AppState,
    auth::CallerIdentity,
    db::{Comment, is_foreign_key_violation, post_exists},
    validate,
};

#[derive(Debug, Default, Deserialize)]
pub struct NewComment {
    pub post: Option<String>,
    pub comment: Option<String>,
}

pub async fn create_comment(db_pool: &SqlitePool, caller: &CallerIdentity, new: NewComment) -> AppResult<Comment> {
    let post_id = validate::uuid_field("post", new.post.as_deref())?;
    let text = validate::comment(new.comment)?;
    if !post_exists(db_pool, post_id).await? {
        return Err(AppError::NotFound("Post"));
    }

    let now = OffsetDateTime::now_utc();
    let comment = Comment {
        id: Uuid::now_v7(),
        profile_id: caller.profile_id,
        post_id,
        comment: text,
        created_at: now,
        updated_at: now,
    };

    sqlx::query("INSERT INTO comments (id,profile_id,post_id,comment,created_at,updated_at) VALUES (?,?,?,?,?,?)")
        .bind(comment.id)
        .bind(comment.profile_id)
        .bind(comment.post_id)
        .bind(&comment.comment)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(db_pool)
        .await
        .map_err(|err| {
            // the post went away after the existence check
            if is_foreign_key_violation(&err) {
                AppError::NotFound("Post")
            } else {
                err.into()
            }
        })?;

    info!(comment_id = %comment.id, post_id = %comment.post_id, "comment added");
    Ok(comment)
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_comment(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppJson(new): AppJson<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    Ok((StatusCode::CREATED, Json(create_comment(&db_pool, &caller, new).await?)))
}
