use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use sqlx::{FromRow, SqlitePool};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState, session::USER_ID};

/// The account and profile a request acts as. Resolved once per request and
/// handed to every operation that needs to know who is asking.
#[derive(Debug, Clone, FromRow)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub username: String,
}

const CALLER_BY_TOKEN: &str = "SELECT p.user_id, p.id AS profile_id, p.username FROM tokens t JOIN profiles p ON p.user_id = t.user_id WHERE t.key = ?";
const CALLER_BY_USER: &str = "SELECT p.user_id, p.id AS profile_id, p.username FROM profiles p WHERE p.user_id = ?";

impl CallerIdentity {
    /// A presented token must be valid; without one the login session is
    /// consulted, and a session whose account is gone counts as anonymous.
    async fn resolve(parts: &mut Parts, state: &AppState) -> AppResult<Option<Self>> {
        if let Some(key) = presented_token(&parts.headers)? {
            return Self::by_token(&state.db_pool, &key)
                .await?
                .map(Some)
                .ok_or(AppError::Unauthenticated);
        }

        let session = <Session as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow!(msg)))?;
        let Some(user_id) = session.get::<Uuid>(USER_ID).await? else {
            return Ok(None);
        };

        Ok(sqlx::query_as::<_, Self>(CALLER_BY_USER)
            .bind(user_id)
            .fetch_optional(&state.db_pool)
            .await?)
    }

    pub async fn by_token(db_pool: &SqlitePool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(CALLER_BY_TOKEN)
            .bind(key)
            .fetch_optional(db_pool)
            .await
    }
}

/// `Authorization: Token <key>` or `Authorization: Bearer <key>`. Other
/// schemes are ignored.
fn presented_token(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::Unauthenticated)?;

    let Some(key) = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
    else {
        return Ok(None);
    };

    match key.trim() {
        "" => Err(AppError::Unauthenticated),
        key => Ok(Some(key.to_owned())),
    }
}

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Self::resolve(parts, state).await?.ok_or(AppError::Unauthenticated)
    }
}

impl OptionalFromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>, Self::Rejection> {
        Self::resolve(parts, state).await
    }
}
