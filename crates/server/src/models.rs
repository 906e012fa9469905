//! Domain models shared across stores, service, and handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record stored in database
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Public user info embedded in posts (no sensitive data)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Post as returned to clients, creator populated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current user's profile, ownership list included
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub posts: Vec<String>,
}

/// Input for createPost / updatePost
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

/// One page of the feed plus the collection total
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_items: i64,
}

/// What happened to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedAction {
    #[serde(rename = "create")]
    Created,
    #[serde(rename = "update")]
    Updated,
    #[serde(rename = "delete")]
    Deleted,
}

/// Mutation event fanned out to all connected subscribers.
///
/// Ephemeral: published after the storage mutation commits, never persisted,
/// delivered best-effort to whoever is connected at publish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEvent {
    pub action: FeedAction,
    pub post: Post,
}
