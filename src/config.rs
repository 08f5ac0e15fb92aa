//! Server configuration loaded from environment variables (and `.env`).
//!
//! Every setting has a default so a fresh checkout starts without any
//! configuration.

use std::{fmt::Display, net::SocketAddr, str::FromStr};

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `DATABASE_URL`
    /// Default: `sqlite://photogram.db`
    pub database_url: String,

    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Env: `DB_MAX_CONNECTIONS`
    /// Default: `16`
    pub max_connections: u32,

    /// Minutes of inactivity before a login session expires.
    /// Env: `SESSION_INACTIVITY_MINUTES`
    /// Default: `60`
    pub session_inactivity_minutes: i64,

    /// Env: `COOKIE_SECURE` (`true`/`false`, anything else keeps the default)
    /// Default: `false`
    pub cookie_secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://photogram.db".to_string(),
            http_addr: ([0, 0, 0, 0], 8080).into(),
            max_connections: 16,
            session_inactivity_minutes: 60,
            cookie_secure: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database_url: dotenv::var("DATABASE_URL").unwrap_or(defaults.database_url),
            http_addr: parsed("HTTP_ADDR", defaults.http_addr),
            max_connections: parsed("DB_MAX_CONNECTIONS", defaults.max_connections),
            session_inactivity_minutes: parsed(
                "SESSION_INACTIVITY_MINUTES",
                defaults.session_inactivity_minutes,
            ),
            cookie_secure: parsed("COOKIE_SECURE", defaults.cookie_secure),
        }
    }
}

fn parsed<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Ok(raw) = dotenv::var(key) else {
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!(key, value = %raw, error = %e, "invalid value, using default {default}");
        default
    })
}
