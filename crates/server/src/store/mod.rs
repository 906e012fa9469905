//! sqlite persistence: user store, post store, and schema bootstrap.
//!
//! `user_posts` is the explicit ownership list; it is only ever written
//! inside the same transaction as the matching `posts` row, so the two
//! can not diverge (see [`posts::PostStore`]).

pub mod posts;
pub mod users;

pub use posts::{PostStore, PAGE_SIZE};
pub use users::UserStore;

use sqlx::SqlitePool;

/// Create tables if they do not exist yet.
pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            image_url TEXT NOT NULL,
            creator_id TEXT NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_posts (
            user_id TEXT NOT NULL REFERENCES users(id),
            post_id TEXT NOT NULL REFERENCES posts(id),
            PRIMARY KEY (user_id, post_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
