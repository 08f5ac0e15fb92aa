use axum::{Json, debug_handler, extract::State};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AppError, AppPath, AppResult, AppState, auth::CallerIdentity};

/// Which end of the caller's edges to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Edges where the caller is the follower, projected to who they follow.
    Followings,
    /// Edges where the caller is followed, projected to who follows them.
    Followers,
}

impl Side {
    fn query(self, by_id: bool) -> String {
        let (owner_col, other_col) = match self {
            Side::Followings => ("follower_id", "following_id"),
            Side::Followers => ("following_id", "follower_id"),
        };

        let mut sql = format!(
            "SELECT r.id, r.follower_id AS follower, r.following_id AS following, r.created_at, \
             p.username, p.name, p.profile_picture \
             FROM relations r JOIN profiles p ON p.id = r.{other_col} \
             WHERE r.{owner_col} = ?"
        );
        if by_id {
            sql.push_str(" AND r.id = ?");
        } else {
            // rowid follows insertion order; the stored timestamps are text
            sql.push_str(" ORDER BY r.rowid DESC");
        }
        sql
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Edge {
    pub id: Uuid,
    pub follower: Uuid,
    pub following: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// The profile on the other end of the edge.
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: EdgeProfile,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EdgeProfile {
    pub username: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
}

/// The caller's own edges on one side, newest first. Nobody else's edges are
/// ever visible.
pub async fn edges(db_pool: &SqlitePool, caller: &CallerIdentity, side: Side) -> AppResult<Vec<Edge>> {
    Ok(sqlx::query_as::<_, Edge>(&side.query(false))
        .bind(caller.profile_id)
        .fetch_all(db_pool)
        .await?)
}

pub async fn edge(db_pool: &SqlitePool, caller: &CallerIdentity, side: Side, id: Uuid) -> AppResult<Edge> {
    sqlx::query_as::<_, Edge>(&side.query(true))
        .bind(caller.profile_id)
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("Relation"))
}

#[debug_handler(state = AppState)]
pub(crate) async fn followings(State(db_pool): State<SqlitePool>, caller: CallerIdentity) -> AppResult<Json<Vec<Edge>>> {
    Ok(Json(edges(&db_pool, &caller, Side::Followings).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn followers(State(db_pool): State<SqlitePool>, caller: CallerIdentity) -> AppResult<Json<Vec<Edge>>> {
    Ok(Json(edges(&db_pool, &caller, Side::Followers).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn following(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Edge>> {
    Ok(Json(edge(&db_pool, &caller, Side::Followings, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn follower(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Edge>> {
    Ok(Json(edge(&db_pool, &caller, Side::Followers, id).await?))
}
