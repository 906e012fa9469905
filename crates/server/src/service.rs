//! Feed service: the operation layer.
//!
//! Every operation checks the caller's identity first (signup and login
//! excepted), validates input, mutates the stores, and only then publishes
//! the matching event to the hub — subscribers never see an event for a
//! mutation that did not commit.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::hub::FeedHub;
use crate::identity::Identity;
use crate::images::ImageStore;
use crate::models::{FeedAction, FeedEvent, Post, PostInput, PostPage, Profile, User};
use crate::store::{PostStore, UserStore};
use crate::token::TokenService;
use crate::validate;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct FeedService {
    users: UserStore,
    posts: PostStore,
    tokens: TokenService,
    hub: Arc<FeedHub>,
    images: ImageStore,
}

impl FeedService {
    pub fn new(
        users: UserStore,
        posts: PostStore,
        tokens: TokenService,
        hub: Arc<FeedHub>,
        images: ImageStore,
    ) -> Self {
        Self {
            users,
            posts,
            tokens,
            hub,
            images,
        }
    }

    pub async fn signup(&self, email: &str, name: &str, password: &str) -> Result<User> {
        let errors = validate::signup_errors(email, password);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let password_hash = hash(password, DEFAULT_COST)?;
        self.users.create(email, name, &password_hash).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found!".to_string()))?;

        if !verify(password, &user.password_hash)? {
            info!("failed login attempt for {}", email);
            return Err(ApiError::Unauthenticated(
                "Password is incorrect.".to_string(),
            ));
        }

        let token = self.tokens.issue(&user.id, &user.email)?;
        Ok(LoginResult {
            token,
            user_id: user.id,
        })
    }

    pub async fn create_post(&self, identity: &Identity, input: &PostInput) -> Result<Post> {
        let user_id = identity.require()?;

        let mut errors = validate::post_errors(&input.title, &input.content);
        if input.image_url.trim().is_empty() {
            errors.push(crate::error::FieldError::new("No image provided."));
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let user = self.require_user(user_id).await?;
        let post = self
            .posts
            .create_for_user(&user, &input.title, &input.content, &input.image_url)
            .await?;

        info!("post {} created by {}", post.id, user.name);
        self.publish(FeedAction::Created, post.clone());
        Ok(post)
    }

    /// One page of the feed, page size fixed at 2, newest-first. Page
    /// defaults to 1; an empty page is a valid result, not an error.
    pub async fn posts_page(&self, page: Option<u32>) -> Result<PostPage> {
        let page = page.unwrap_or(1).max(1);
        let (posts, total_items) = self.posts.page(page).await?;
        Ok(PostPage { posts, total_items })
    }

    pub async fn post(&self, identity: &Identity, post_id: &str) -> Result<Post> {
        identity.require()?;
        self.posts
            .find(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Could not find post.".to_string()))
    }

    pub async fn update_post(
        &self,
        identity: &Identity,
        post_id: &str,
        input: &PostInput,
    ) -> Result<Post> {
        let user_id = identity.require()?;

        let post = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Could not find post.".to_string()))?;
        if post.creator.id != user_id {
            return Err(ApiError::Forbidden);
        }

        let errors = validate::post_errors(&input.title, &input.content);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        // Retaining the previous image is signalled by sending it back.
        let image_url = if input.image_url.trim().is_empty() {
            post.image_url.clone()
        } else {
            input.image_url.clone()
        };
        if image_url != post.image_url {
            self.images.remove(&post.image_url).await;
        }

        self.posts
            .update(post_id, &input.title, &input.content, &image_url)
            .await?;
        let updated = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Could not find post.".to_string()))?;

        self.publish(FeedAction::Updated, updated.clone());
        Ok(updated)
    }

    pub async fn delete_post(&self, identity: &Identity, post_id: &str) -> Result<()> {
        let user_id = identity.require()?;

        let post = self
            .posts
            .find(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Could not find post.".to_string()))?;
        if post.creator.id != user_id {
            return Err(ApiError::Forbidden);
        }

        self.images.remove(&post.image_url).await;
        self.posts.delete_for_user(post_id, user_id).await?;

        info!("post {} deleted by its creator", post_id);
        self.publish(FeedAction::Deleted, post);
        Ok(())
    }

    /// Current user's profile, ownership list included.
    pub async fn profile(&self, identity: &Identity) -> Result<Profile> {
        let user_id = identity.require()?;
        let user = self.require_user(user_id).await?;
        let posts = self.users.post_ids(user_id).await?;

        Ok(Profile {
            id: user.id,
            email: user.email,
            name: user.name,
            status: user.status,
            posts,
        })
    }

    pub async fn status(&self, identity: &Identity) -> Result<String> {
        let user_id = identity.require()?;
        let user = self.require_user(user_id).await?;
        Ok(user.status)
    }

    pub async fn update_status(&self, identity: &Identity, status: &str) -> Result<String> {
        let user_id = identity.require()?;

        if !self.users.set_status(user_id, status).await? {
            return Err(ApiError::NotFound("User not found.".to_string()));
        }
        Ok(status.to_string())
    }

    pub fn image_store(&self) -> &ImageStore {
        &self.images
    }

    async fn require_user(&self, user_id: &str) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
    }

    // Called only after the storage mutation has committed.
    fn publish(&self, action: FeedAction, post: Post) {
        self.hub.publish(FeedEvent { action, post });
    }
}
