use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{AppJson, AppResult, AppState, auth::CallerIdentity, db::Post, validate};

/// There is deliberately no `profile` field: a post always belongs to
/// whoever creates it.
#[derive(Debug, Default, Deserialize)]
pub struct NewPost {
    pub post_picture: Option<String>,
    pub description: Option<String>,
}

pub async fn create_post(db_pool: &SqlitePool, caller: &CallerIdentity, new: NewPost) -> AppResult<Post> {
    let now = OffsetDateTime::now_utc();
    let post = Post {
        id: Uuid::now_v7(),
        profile_id: caller.profile_id,
        post_picture: validate::optional_text("post_picture", new.post_picture, None)?,
        description: validate::optional_text("description", new.description, None)?,
        created_at: now,
        updated_at: now,
    };

    sqlx::query("INSERT INTO posts (id,profile_id,post_picture,description,created_at,updated_at) VALUES (?,?,?,?,?,?)")
        .bind(post.id)
        .bind(post.profile_id)
        .bind(&post.post_picture)
        .bind(&post.description)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(db_pool)
        .await?;

    info!(post_id = %post.id, profile_id = %post.profile_id, "post created");
    Ok(post)
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_post(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppJson(new): AppJson<NewPost>,
) -> AppResult<(StatusCode, Json<Post>)> {
    Ok((StatusCode::CREATED, Json(create_post(&db_pool, &caller, new).await?)))
}
