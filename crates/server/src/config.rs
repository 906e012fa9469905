//! Server configuration and shared app state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::hub::FeedHub;
use crate::images::ImageStore;
use crate::service::FeedService;
use crate::token::TokenService;

/// Environment-derived configuration. The storage target and signing secret
/// are required; startup fails without them.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// sqlite path or URL
    pub database_url: String,
    /// Listen port
    pub port: u16,
    /// Credential-signing secret, the single canonical one
    pub jwt_secret: String,
    /// Allowed cross-origin client host; None means permissive
    pub client_host: Option<String>,
    /// Stored-image directory
    pub image_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set (sqlite path)")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 8080,
        };

        let client_host = std::env::var("CLIENT_HOST").ok();
        let image_dir = std::env::var("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("images"));

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            client_host,
            image_dir,
        })
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: FeedService,
    pub tokens: TokenService,
    pub hub: Arc<FeedHub>,
    pub images: ImageStore,
}
