use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tower_sessions::Session;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AppError, AppJson, AppResult, AppState, session::USER_ID, validate::normalize_username};

use super::{new_token_key, verify_password};

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// Hands back the account's token (creating it on first login) and also
/// starts a cookie session.
#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AppJson(LoginRequest { username, password }): AppJson<LoginRequest>,
) -> AppResult<Json<Value>> {
    let username = normalize_username(&username.unwrap_or_default());
    let password = password.unwrap_or_default();

    let account: Option<(Uuid, String)> = sqlx::query_as("SELECT id,password_hash FROM users WHERE username=?")
        .bind(&username)
        .fetch_optional(&db_pool)
        .await?;

    let Some((user_id, _)) = account.filter(|(_, hash)| verify_password(&password, hash)) else {
        warn!(%username, "failed login");
        return Err(AppError::InvalidCredentials);
    };

    sqlx::query("INSERT INTO tokens (key,user_id,created_at) VALUES (?,?,?) ON CONFLICT (user_id) DO NOTHING")
        .bind(new_token_key())
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .execute(&db_pool)
        .await?;

    let (key,): (String,) = sqlx::query_as("SELECT key FROM tokens WHERE user_id=?")
        .bind(user_id)
        .fetch_one(&db_pool)
        .await?;

    session.insert(USER_ID, user_id).await?;

    info!(%user_id, %username, "welcome");
    Ok(Json(json!({ "token": format!("Token {key}") })))
}
