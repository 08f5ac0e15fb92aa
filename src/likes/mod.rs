//! Likes on posts. A profile likes a post at most once; `POST /likes/`
//! toggles the like the same way following toggles an edge.

mod page;
mod toggle;

use axum::{Router, routing::get};

use crate::{AppState, method_not_allowed};

pub use page::{delete_like, like_of, likes_of};
pub use toggle::{LikeToggle, toggle_like};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/likes/", get(page::likes).post(toggle::like))
        .route(
            "/likes/{id}/",
            get(page::like)
                .put(method_not_allowed)
                .patch(method_not_allowed)
                .delete(page::unlike),
        )
}
