use anyhow::anyhow;
use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    AppError, AppJson, AppResult, AppState,
    auth::CallerIdentity,
    db::{is_foreign_key_violation, is_unique_violation, post_exists},
    validate,
};

const INSERT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    Liked,
    Unliked,
}

pub async fn toggle_like(db_pool: &SqlitePool, caller: &CallerIdentity, post_id: Uuid) -> AppResult<LikeToggle> {
    if !post_exists(db_pool, post_id).await? {
        return Err(AppError::NotFound("Post"));
    }

    let removed = sqlx::query("DELETE FROM likes WHERE profile_id=? AND post_id=?")
        .bind(caller.profile_id)
        .bind(post_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if removed > 0 {
        info!(profile_id = %caller.profile_id, %post_id, "unliked");
        return Ok(LikeToggle::Unliked);
    }

    for _ in 0..INSERT_ATTEMPTS {
        let inserted = sqlx::query("INSERT INTO likes (id,profile_id,post_id,liked_at) VALUES (?,?,?,?)")
            .bind(Uuid::now_v7())
            .bind(caller.profile_id)
            .bind(post_id)
            .bind(OffsetDateTime::now_utc())
            .execute(db_pool)
            .await;

        match inserted {
            Ok(_) => {
                info!(profile_id = %caller.profile_id, %post_id, "liked");
                return Ok(LikeToggle::Liked);
            }
            Err(err) if is_unique_violation(&err) => {
                debug!(profile_id = %caller.profile_id, %post_id, "like already exists, re-reading");
                let exists = sqlx::query("SELECT 1 FROM likes WHERE profile_id=? AND post_id=?")
                    .bind(caller.profile_id)
                    .bind(post_id)
                    .fetch_optional(db_pool)
                    .await?
                    .is_some();
                if exists {
                    return Ok(LikeToggle::Liked);
                }
            }
            Err(err) if is_foreign_key_violation(&err) => return Err(AppError::NotFound("Post")),
            Err(err) => return Err(err.into()),
        }
    }

    Err(anyhow!("like on {post_id} kept vanishing").into())
}

#[derive(Deserialize)]
pub(crate) struct LikeRequest {
    post: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn like(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppJson(LikeRequest { post }): AppJson<LikeRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let post_id = validate::uuid_field("post", post.as_deref())?;
    let status = toggle_like(&db_pool, &caller, post_id).await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": status, "post": post_id }))))
}
