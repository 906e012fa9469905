//! Post store: post records and the cross-entity create/delete operations.
//!
//! `create_for_user` and `delete_for_user` each run one sqlite transaction
//! spanning `posts` and `user_posts`, so a post row and its entry in the
//! creator's ownership list commit or roll back together.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, PublicUser, User};

/// Fixed page size of the feed listing.
pub const PAGE_SIZE: i64 = 2;

#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

type PostRow = (
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
);

fn row_to_post(row: PostRow) -> Post {
    let (id, title, content, image_url, created_at, updated_at, creator_id, creator_name) = row;
    Post {
        id,
        title,
        content,
        image_url,
        creator: PublicUser {
            id: creator_id,
            name: creator_name,
        },
        created_at,
        updated_at,
    }
}

const SELECT_POST: &str = "SELECT p.id, p.title, p.content, p.image_url, \
     p.created_at, p.updated_at, u.id, u.name \
     FROM posts p JOIN users u ON u.id = p.creator_id";

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post and append it to the creator's ownership list as a
    /// single logical unit.
    pub async fn create_for_user(
        &self,
        creator: &User,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            image_url: image_url.to_string(),
            creator: PublicUser {
                id: creator.id.clone(),
                name: creator.name.clone(),
            },
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO posts (id, title, content, image_url, creator_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(&creator.id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_posts (user_id, post_id) VALUES (?, ?)")
            .bind(&creator.id)
            .bind(&post.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(post)
    }

    /// Delete a post and remove it from the owner's list as a single
    /// logical unit.
    pub async fn delete_for_user(&self, post_id: &str, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_posts WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn find(&self, post_id: &str) -> Result<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as(&format!("{} WHERE p.id = ?", SELECT_POST))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(row_to_post))
    }

    /// One page of the feed, newest-first by creation time. Equal timestamps
    /// keep insertion order, so repeated calls with no intervening writes
    /// return identical results.
    pub async fn page(&self, page: u32) -> Result<(Vec<Post>, i64)> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        let offset = (i64::from(page) - 1) * PAGE_SIZE;
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "{} ORDER BY p.created_at DESC, p.rowid ASC LIMIT ? OFFSET ?",
            SELECT_POST
        ))
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(row_to_post).collect(), total))
    }

    /// Overwrite mutable fields and bump `updated_at`.
    pub async fn update(
        &self,
        post_id: &str,
        title: &str,
        content: &str,
        image_url: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE posts SET title = ?, content = ?, image_url = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(image_url)
        .bind(Utc::now())
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
