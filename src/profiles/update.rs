use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    AppJson, AppPath, AppResult, AppState,
    auth::CallerIdentity,
    db::unique_as_invalid,
    permissions::{Ownership, ResourceKind, authorize},
    validate,
};

use super::{ProfileView, profile_by_username};

const USERNAME_TAKEN: &str = "username: A profile with that username already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub profile_picture: Option<String>,
}

/// Applies `changes` to the profile called `username`. With `partial`
/// absent fields keep their value, otherwise they are cleared (and
/// `username` becomes required). Renaming the profile renames the account
/// with it.
pub async fn update_profile_fields(
    db_pool: &SqlitePool,
    caller: &CallerIdentity,
    username: &str,
    changes: ProfileChanges,
    partial: bool,
) -> AppResult<ProfileView> {
    let current = profile_by_username(db_pool, username).await?.profile;
    authorize(Some(caller), ResourceKind::Profile, &Ownership::owned_by(current.id))?;

    let keep = |new: Option<String>, old: Option<String>| if partial { new.or(old) } else { new };

    let new_username = match changes.username {
        Some(raw) => validate::username(Some(&raw))?,
        None if partial => current.username.clone(),
        None => return Err(validate::required("username")),
    };
    let name = validate::optional_text("name", keep(changes.name, current.name), Some(validate::NAME_MAX))?;
    let bio = validate::optional_text("bio", keep(changes.bio, current.bio), None)?;
    let website = validate::website(keep(changes.website, current.website))?;
    let profile_picture = validate::optional_text(
        "profile_picture",
        keep(changes.profile_picture, current.profile_picture),
        None,
    )?;

    let mut tx = db_pool.begin().await?;

    sqlx::query("UPDATE profiles SET username=?,name=?,bio=?,website=?,profile_picture=?,updated_at=? WHERE id=?")
        .bind(&new_username)
        .bind(name)
        .bind(bio)
        .bind(website)
        .bind(profile_picture)
        .bind(OffsetDateTime::now_utc())
        .bind(current.id)
        .execute(&mut *tx)
        .await
        .map_err(unique_as_invalid(USERNAME_TAKEN))?;

    if new_username != current.username {
        sqlx::query("UPDATE users SET username=? WHERE id=?")
            .bind(&new_username)
            .bind(current.user_id)
            .execute(&mut *tx)
            .await
            .map_err(unique_as_invalid(USERNAME_TAKEN))?;
    }

    tx.commit().await?;
    info!(profile_id = %current.id, username = %new_username, "profile updated");

    profile_by_username(db_pool, &new_username).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(username): AppPath<String>,
    AppJson(changes): AppJson<ProfileChanges>,
) -> AppResult<Json<ProfileView>> {
    Ok(Json(update_profile_fields(&db_pool, &caller, &username, changes, true).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn replace_profile(
    State(db_pool): State<SqlitePool>,
    caller: CallerIdentity,
    AppPath(username): AppPath<String>,
    AppJson(changes): AppJson<ProfileChanges>,
) -> AppResult<Json<ProfileView>> {
    Ok(Json(update_profile_fields(&db_pool, &caller, &username, changes, false).await?))
}
