//! HTTP handlers for the feed server.
//!
//! Thin axum wrappers: every handler delegates to the feed service and
//! converts its typed result into a response.

pub mod auth;
pub mod feed;
pub mod images;
pub mod subscribe;

pub use auth::{get_status, login, me, signup, update_status};
pub use feed::{create_post, delete_post, get_post, get_posts, update_post};
pub use images::upload_image;
pub use subscribe::feed_subscribe;
