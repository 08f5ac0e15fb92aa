use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::info;

use crate::{AppJson, AppResult, AppState, validate};

use super::create_account;

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    AppJson(RegisterRequest { username, email, password }): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let username = validate::username(username.as_deref())?;
    let email = validate::email(email)?;
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Err(validate::required("password"));
    };

    let mut tx = db_pool.begin().await?;
    let profile_id = create_account(&mut tx, &username, &email, &password).await?;
    tx.commit().await?;

    info!(%profile_id, %username, "registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "detail": "User Account Created Successfully",
            "profile": profile_id,
            "username": username,
        })),
    ))
}
