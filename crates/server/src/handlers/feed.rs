//! Feed handlers: post CRUD and pagination.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;
use crate::identity::Identity;
use crate::models::PostInput;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// GET /feed/posts?page=N
///
/// Public listing; the page defaults to 1 and an empty page is a valid
/// response.
pub async fn get_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let page = state.service.posts_page(query.page).await?;

    Ok(Json(json!({
        "message": "Fetched posts successfully!",
        "posts": page.posts,
        "totalItems": page.total_items,
    })))
}

/// POST /feed/posts
pub async fn create_post(
    State(state): State<AppState>,
    identity: Identity,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Value>)> {
    info!("POST /feed/posts - {}", input.title);

    let post = state.service.create_post(&identity, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully!",
            "post": post,
        })),
    ))
}

/// GET /feed/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state.service.post(&identity, &post_id).await?;

    Ok(Json(json!({
        "message": "Post fetched successfully!",
        "post": post,
    })))
}

/// PUT /feed/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<Value>> {
    info!("PUT /feed/posts/{}", post_id);

    let post = state
        .service
        .update_post(&identity, &post_id, &input)
        .await?;

    Ok(Json(json!({
        "message": "Post updated successfully!",
        "post": post,
    })))
}

/// DELETE /feed/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    identity: Identity,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    info!("DELETE /feed/posts/{}", post_id);

    state.service.delete_post(&identity, &post_id).await?;

    Ok(Json(json!({ "message": "Post deleted successfully!" })))
}
