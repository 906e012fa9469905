//! Auth handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;
use crate::identity::Identity;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    info!("POST /auth/signup - {}", req.email);

    let user = state
        .service
        .signup(&req.email, &req.name, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User successfully created!",
            "user": user,
        })),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<crate::service::LoginResult>> {
    info!("POST /auth/login - {}", req.email);

    let result = state.service.login(&req.email, &req.password).await?;
    Ok(Json(result))
}

/// GET /auth/status
pub async fn get_status(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<StatusResponse>> {
    let status = state.service.status(&identity).await?;
    Ok(Json(StatusResponse { status }))
}

/// PUT /auth/status
pub async fn update_status(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>> {
    info!("PUT /auth/status");

    let status = state.service.update_status(&identity, &req.status).await?;
    Ok(Json(StatusResponse { status }))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, identity: Identity) -> Result<Json<Value>> {
    let profile = state.service.profile(&identity).await?;
    Ok(Json(json!({ "user": profile })))
}
