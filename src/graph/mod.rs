//! Follow edges between profiles.
//!
//! An edge `(follower, following)` exists at most once and never points a
//! profile at itself. The only way to change the graph is
//! [`toggle_follow`]; edges cannot be updated or deleted by id.

mod list;
mod toggle;

use axum::{Router, routing::get};

use crate::{AppState, method_not_allowed};

pub use list::{Edge, EdgeProfile, Side, edge, edges};
pub use toggle::{FollowToggle, toggle_follow};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/followings/", get(list::followings).post(toggle::follow))
        .route(
            "/profile/followings/{id}/",
            get(list::following)
                .put(method_not_allowed)
                .patch(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route("/profile/followers/", get(list::followers).post(method_not_allowed))
        .route(
            "/profile/followers/{id}/",
            get(list::follower)
                .put(method_not_allowed)
                .patch(method_not_allowed)
                .delete(method_not_allowed),
        )
}
