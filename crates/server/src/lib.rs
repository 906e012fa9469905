//! Feed Server Library
//!
//! Authenticated mutation-and-broadcast pipeline: token auth, post storage
//! with an owner-consistent post list, offset pagination, and live fan-out
//! of mutation events to connected subscribers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod identity;
pub mod images;
pub mod models;
pub mod service;
pub mod store;
pub mod token;
pub mod validate;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{AppState, ServerConfig};
use hub::FeedHub;
use identity::auth_gate;
use images::ImageStore;
use service::FeedService;
use store::{PostStore, UserStore};
use token::TokenService;

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Feed Server ===");

    let config = ServerConfig::from_env()?;

    let state = build_state(&config).await?;
    state.images.ensure_dir().await?;

    let cors = match &config.client_host {
        Some(host) => CorsLayer::new()
            .allow_origin(
                host.parse::<HeaderValue>()
                    .context("CLIENT_HOST is not a valid origin")?,
            )
            .allow_methods([
                Method::OPTIONS,
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Feed server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connect the store, initialize the schema, and wire up the services.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("DATABASE_URL is not a valid sqlite target")?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await
        .context("failed to connect to the database")?;

    store::init_db(&pool).await?;
    info!("Database initialized at {}", config.database_url);

    let tokens = TokenService::new(config.jwt_secret.as_bytes());
    let hub = Arc::new(FeedHub::new(64));
    let images = ImageStore::new(&config.image_dir);
    let service = FeedService::new(
        UserStore::new(pool.clone()),
        PostStore::new(pool),
        tokens.clone(),
        hub.clone(),
        images.clone(),
    );

    Ok(AppState {
        service,
        tokens,
        hub,
        images,
    })
}

/// Build the router with the auth gate mounted over every route. CORS and
/// request tracing are layered on by [`run`].
pub fn router(state: AppState) -> Router {
    Router::new()
        // Auth endpoints
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/me", get(handlers::me))
        .route(
            "/auth/status",
            get(handlers::get_status).put(handlers::update_status),
        )
        // Feed endpoints
        .route(
            "/feed/posts",
            get(handlers::get_posts).post(handlers::create_post),
        )
        .route(
            "/feed/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // Live updates
        .route("/feed/subscribe", get(handlers::feed_subscribe))
        // Image upload + static serving
        .route("/post-image", put(handlers::upload_image))
        .nest_service("/images", ServeDir::new(state.images.root()))
        // Health check
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK - Feed Server"
}
