mod edit;
mod new;
mod page;

use axum::{Router, routing::get};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{AppError, AppResult, AppState, db::Comment, permissions::Ownership};

pub use edit::{delete_comment, edit_comment};
pub use new::{NewComment, create_comment};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments/", get(page::comments).post(new::new_comment))
        .route(
            "/comments/{id}/",
            get(page::comment)
                .put(edit::replace)
                .patch(edit::patch)
                .delete(edit::delete),
        )
}

/// A comment plus the owner of the post it is on, who shares the right to
/// remove it.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct OwnedComment {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub post_owner: Uuid,
}

impl OwnedComment {
    pub fn ownership(&self) -> Ownership {
        Ownership::with_parent(self.comment.profile_id, self.post_owner)
    }
}

/// Newest first, by insertion order.
pub async fn list_comments(db_pool: &SqlitePool) -> AppResult<Vec<Comment>> {
    Ok(sqlx::query_as::<_, Comment>("SELECT * FROM comments ORDER BY rowid DESC")
        .fetch_all(db_pool)
        .await?)
}

pub(crate) async fn fetch_comment(db_pool: &SqlitePool, id: Uuid) -> AppResult<OwnedComment> {
    sqlx::query_as::<_, OwnedComment>(
        "SELECT c.*, p.profile_id AS post_owner FROM comments c JOIN posts p ON p.id = c.post_id WHERE c.id=?",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?
    .ok_or(AppError::NotFound("Comment"))
}
