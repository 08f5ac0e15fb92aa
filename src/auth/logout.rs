use axum::{Json, debug_handler, extract::State};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, AppState};

use super::CallerIdentity;

#[debug_handler(state = AppState)]
pub(crate) async fn logout(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    session: Session,
) -> AppResult<Json<Value>> {
    sqlx::query("DELETE FROM tokens WHERE user_id=?")
        .bind(caller.user_id)
        .execute(&db_pool)
        .await?;
    session.clear().await;

    info!(user_id = %caller.user_id, "logged out");
    Ok(Json(json!({ "detail": "You are logged out." })))
}
