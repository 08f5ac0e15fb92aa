use sqlx::SqlitePool;

use crate::auth::{CallerIdentity, create_account};

pub(crate) async fn account(db_pool: &SqlitePool, username: &str) -> CallerIdentity {
    let mut conn = db_pool.acquire().await.unwrap();
    create_account(&mut conn, username, "", "password").await.unwrap();
    drop(conn);

    sqlx::query_as("SELECT p.user_id, p.id AS profile_id, p.username FROM profiles p WHERE p.username = ?")
        .bind(username)
        .fetch_one(db_pool)
        .await
        .unwrap()
}
