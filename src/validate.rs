//! Field checks shared by the request handlers. Each failure is a 400 whose
//! detail starts with the offending field name.

use email_address::EmailAddress;
use url::Url;
use uuid::Uuid;

use crate::{AppError, AppResult};

pub const USERNAME_MAX: usize = 50;
pub const NAME_MAX: usize = 100;
pub const WEBSITE_MAX: usize = 200;
pub const COMMENT_MAX: usize = 255;

/// Would shadow `/profile/followings/` and `/profile/followers/`.
const RESERVED_USERNAMES: [&str; 2] = ["followings", "followers"];

pub(crate) fn required(field: &str) -> AppError {
    AppError::invalid(format!("{field}: This field is required."))
}

/// Usernames are stored lowercased without spaces, which is also how login
/// looks them up.
pub(crate) fn normalize_username(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "")
}

pub(crate) fn username(raw: Option<&str>) -> AppResult<String> {
    let username = normalize_username(raw.ok_or_else(|| required("username"))?);

    if username.is_empty() {
        return Err(required("username"));
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(too_long("username", USERNAME_MAX));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AppError::invalid(
            "username: Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.as_str()) {
        return Err(AppError::invalid("username: This username is reserved."));
    }

    Ok(username)
}

pub(crate) fn email(raw: Option<String>) -> AppResult<String> {
    let email = raw.unwrap_or_default().trim().to_owned();
    if !email.is_empty() && !EmailAddress::is_valid(&email) {
        return Err(AppError::invalid("email: Enter a valid email address."));
    }
    Ok(email)
}

/// Blank text collapses to `None`.
pub(crate) fn optional_text(field: &str, raw: Option<String>, max: Option<usize>) -> AppResult<Option<String>> {
    let Some(text) = raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match max {
        Some(max) if text.chars().count() > max => Err(too_long(field, max)),
        _ => Ok(Some(text)),
    }
}

pub(crate) fn website(raw: Option<String>) -> AppResult<Option<String>> {
    let Some(url) = optional_text("website", raw, Some(WEBSITE_MAX))? else {
        return Ok(None);
    };

    let valid = Url::parse(&url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some_and(|host| !host.is_empty())
    });
    if !valid {
        return Err(AppError::invalid("website: Enter a valid URL."));
    }

    Ok(Some(url))
}

pub(crate) fn comment(raw: Option<String>) -> AppResult<String> {
    optional_text("comment", raw, Some(COMMENT_MAX))?.ok_or_else(|| required("comment"))
}

/// Missing or malformed ids are 400; whether the id points at anything is
/// the caller's 404 to decide.
pub(crate) fn uuid_field(field: &str, raw: Option<&str>) -> AppResult<Uuid> {
    let raw = raw.ok_or_else(|| required(field))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid(format!("{field}: Must be a valid UUID.")))
}

fn too_long(field: &str, max: usize) -> AppError {
    AppError::invalid(format!("{field}: Ensure this field has no more than {max} characters."))
}
