use axum::{debug_handler, extract::State, http::StatusCode};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    AppPath, AppResult, AppState,
    auth::CallerIdentity,
    permissions::{Ownership, ResourceKind, authorize},
};

use super::profile_by_username;

/// Deletes the account behind the profile, then the profile itself. Relations,
/// posts, and everything hanging off those posts go with it.
pub async fn delete_profile_and_account(db_pool: &SqlitePool, caller: &CallerIdentity, username: &str) -> AppResult<()> {
    let profile = profile_by_username(db_pool, username).await?.profile;
    authorize(Some(caller), ResourceKind::Profile, &Ownership::owned_by(profile.id))?;

    let mut tx = db_pool.begin().await?;
    sqlx::query("DELETE FROM users WHERE id=?")
        .bind(profile.user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE id=?")
        .bind(profile.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(profile_id = %profile.id, user_id = %profile.user_id, "profile deleted");
    Ok(())
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_profile(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    session: Session,
    AppPath(username): AppPath<String>,
) -> AppResult<StatusCode> {
    delete_profile_and_account(&db_pool, &caller, &username).await?;
    session.clear().await;
    Ok(StatusCode::NO_CONTENT)
}
