//! User store: user records plus the ordered post-ownership list.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::User;

/// Status assigned to every fresh account.
const DEFAULT_STATUS: &str = "I am new!";

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

type UserRow = (String, String, String, String, String, DateTime<Utc>);

fn row_to_user(row: UserRow) -> User {
    let (id, email, name, password_hash, status, created_at) = row;
    User {
        id,
        email,
        name,
        password_hash,
        status,
        created_at,
    }
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. A duplicate email surfaces as `Conflict`.
    pub async fn create(&self, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            status: DEFAULT_STATUS.to_string(),
            created_at: Utc::now(),
        };

        let res = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.status)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {
                info!("user registered: {} ({})", user.name, user.email);
                Ok(user)
            }
            Err(sqlx::Error::Database(db))
                if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(ApiError::Conflict("User already exists!".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash, status, created_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash, status, created_at \
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Set the user's free-text status. `false` if the id no longer resolves.
    pub async fn set_status(&self, user_id: &str, status: &str) -> Result<bool> {
        let res = sqlx::query("UPDATE users SET status = ? WHERE id = ?")
            .bind(status)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }

    /// Ownership list in insertion order. Append-only from the caller's view:
    /// only post creation and deletion touch it.
    pub async fn post_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT post_id FROM user_posts WHERE user_id = ? ORDER BY rowid")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
