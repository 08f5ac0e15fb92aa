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
    db::{is_foreign_key_violation, is_unique_violation, profile_exists},
    validate,
};

/// Attempts at inserting an edge before giving up; only a follow racing an
/// unfollow of the same pair can use more than one.
const INSERT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FollowToggle {
    #[serde(rename = "following")]
    Followed,
    #[serde(rename = "unfollowed")]
    Unfollowed,
}

/// Follows `target` if the caller doesn't yet, unfollows it otherwise.
pub async fn toggle_follow(db_pool: &SqlitePool, caller: &CallerIdentity, target: Uuid) -> AppResult<FollowToggle> {
    if target == caller.profile_id {
        return Err(AppError::invalid("following: You cannot follow yourself."));
    }
    if !profile_exists(db_pool, target).await? {
        return Err(AppError::NotFound("Profile"));
    }

    if find_edge(db_pool, caller.profile_id, target).await?.is_none() {
        return create_edge(db_pool, caller.profile_id, target).await;
    }

    sqlx::query("DELETE FROM relations WHERE follower_id=? AND following_id=?")
        .bind(caller.profile_id)
        .bind(target)
        .execute(db_pool)
        .await?;

    info!(follower = %caller.profile_id, following = %target, "unfollowed");
    Ok(FollowToggle::Unfollowed)
}

/// Inserts the edge. Losing an insert race to a concurrent follow of the
/// same pair is a no-op success: the edge the other request created is the
/// one we wanted.
pub(crate) async fn create_edge(db_pool: &SqlitePool, follower: Uuid, following: Uuid) -> AppResult<FollowToggle> {
    for _ in 0..INSERT_ATTEMPTS {
        let inserted = sqlx::query("INSERT INTO relations (id,follower_id,following_id,created_at) VALUES (?,?,?,?)")
            .bind(Uuid::now_v7())
            .bind(follower)
            .bind(following)
            .bind(OffsetDateTime::now_utc())
            .execute(db_pool)
            .await;

        match inserted {
            Ok(_) => {
                info!(%follower, %following, "followed");
                return Ok(FollowToggle::Followed);
            }
            Err(err) if is_unique_violation(&err) => {
                debug!(%follower, %following, "edge already exists, re-reading");
                if find_edge(db_pool, follower, following).await?.is_some() {
                    return Ok(FollowToggle::Followed);
                }
            }
            Err(err) if is_foreign_key_violation(&err) => return Err(AppError::NotFound("Profile")),
            Err(err) => return Err(err.into()),
        }
    }

    Err(anyhow!("follow edge {follower} -> {following} kept vanishing").into())
}

async fn find_edge(db_pool: &SqlitePool, follower: Uuid, following: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM relations WHERE follower_id=? AND following_id=?")
        .bind(follower)
        .bind(following)
        .fetch_optional(db_pool)
        .await
}

#[derive(Deserialize)]
pub(crate) struct FollowRequest {
    following: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn follow(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppJson(FollowRequest { following }): AppJson<FollowRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let target = validate::uuid_field("following", following.as_deref())?;
    let status = toggle_follow(&db_pool, &caller, target).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": status, "following": target })),
    ))
}
