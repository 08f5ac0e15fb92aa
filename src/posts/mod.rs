mod edit;
mod new;
mod page;

use axum::{Router, routing::get};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState, db::Post};

pub use edit::{PostChanges, delete_post, update_post};
pub use new::{NewPost, create_post};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(page::posts).post(new::new_post))
        .route(
            "/posts/{id}/",
            get(page::post)
                .put(edit::replace)
                .patch(edit::patch)
                .delete(edit::delete),
        )
}

/// Newest first. rowid follows insertion order, which the RFC 3339 text in
/// `created_at` does not sort by.
pub async fn list_posts(db_pool: &SqlitePool) -> AppResult<Vec<Post>> {
    Ok(sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY rowid DESC")
        .fetch_all(db_pool)
        .await?)
}

pub async fn fetch_post(db_pool: &SqlitePool, id: Uuid) -> AppResult<Post> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound("Post"))
}
