mod caller;
mod login;
mod logout;
mod password;
mod register;

use axum::{Router, routing::post};
use sqlx::SqliteConnection;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::{AppResult, AppState, db::unique_as_invalid};

pub use caller::CallerIdentity;
pub use password::{hash_password, new_token_key, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/user/", post(register::register))
        .route("/user/login/", post(login::login))
        .route("/user/logout/", post(logout::logout))
}

/// Creates the account and its profile. Run it inside a transaction so a
/// failed profile insert doesn't leave an orphaned account.
pub(crate) async fn create_account(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    password: &str,
) -> AppResult<Uuid> {
    let user_id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();

    sqlx::query("INSERT INTO users (id,username,email,password_hash,created_at) VALUES (?,?,?,?,?)")
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(hash_password(password))
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(unique_as_invalid("username: A user with that username already exists."))?;

    let profile_id = Uuid::now_v7();
    sqlx::query("INSERT INTO profiles (id,user_id,username,created_at,updated_at) VALUES (?,?,?,?,?)")
        .bind(profile_id)
        .bind(user_id)
        .bind(username)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(unique_as_invalid("username: A profile with that username already exists."))?;

    debug!(%user_id, %profile_id, %username, "account created");
    Ok(profile_id)
}
