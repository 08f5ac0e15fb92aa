pub mod appresult;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod graph;
pub mod index;
pub mod likes;
pub mod permissions;
pub mod posts;
pub mod profiles;
pub mod session;
pub mod validate;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, FromRequest, FromRequestParts},
    http::Method,
    routing::get,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: Config) -> Self {
        Self { db_pool, config: Arc::new(config) }
    }
}

/// `Json` whose rejections are 400s in the usual error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` whose rejections are 400s in the usual error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// For operations a resource deliberately does not support.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_inactivity_minutes,
        )));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index::index))

        .merge(auth::router())
        .merge(graph::router())
        .merge(profiles::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(likes::router())

        .with_state(state)
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
