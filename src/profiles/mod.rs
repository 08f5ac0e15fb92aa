mod delete;
mod page;
mod update;

use axum::{Router, routing::get};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::{AppError, AppResult, AppState, db::Profile, method_not_allowed, validate::normalize_username};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/", get(page::profiles).post(method_not_allowed))
        .route(
            "/profile/{username}/",
            get(page::profile)
                .put(update::replace_profile)
                .patch(update::update_profile)
                .delete(delete::delete_profile),
        )
}

/// A profile with its follow counts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfileView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: Profile,
    pub followers: i64,
    pub following: i64,
}

const PROFILE_VIEW: &str = "SELECT p.*, \
    (SELECT COUNT(*) FROM relations WHERE following_id = p.id) AS followers, \
    (SELECT COUNT(*) FROM relations WHERE follower_id = p.id) AS following \
    FROM profiles p";

pub async fn list_profiles(db_pool: &SqlitePool) -> AppResult<Vec<ProfileView>> {
    Ok(sqlx::query_as::<_, ProfileView>(&format!("{PROFILE_VIEW} ORDER BY p.username"))
        .fetch_all(db_pool)
        .await?)
}

/// `username` is normalized the way registration and login normalize it.
pub async fn profile_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<ProfileView> {
    sqlx::query_as::<_, ProfileView>(&format!("{PROFILE_VIEW} WHERE p.username = ?"))
        .bind(normalize_username(username))
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("Profile"))
}
