//! Auth gate: turns an optional `Authorization: Bearer` header into a
//! request-scoped identity.
//!
//! The gate never rejects a request. Absent, malformed, or expired
//! credentials all downgrade to [`Identity::Anonymous`] and the request
//! proceeds; rejection is the downstream operation's call. This keeps public
//! endpoints and protected ones behind one shared filter.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::config::AppState;
use crate::error::{ApiError, Result};

/// Authenticated-identity fact for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated { user_id: String },
}

impl Identity {
    /// The caller's user id, or `Unauthenticated` if the request carried no
    /// valid credential.
    pub fn require(&self) -> Result<&str> {
        match self {
            Identity::Authenticated { user_id } => Ok(user_id),
            Identity::Anonymous => Err(ApiError::unauthenticated()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated { .. })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("auth gate not mounted".to_string()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware applied to the whole router. Fail-open: verification failures
/// become anonymous, never a response.
pub async fn auth_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let identity = match bearer_token(req.headers()) {
        Some(token) => match state.tokens.verify(token) {
            Ok(claims) => Identity::Authenticated {
                user_id: claims.sub,
            },
            Err(_) => Identity::Anonymous,
        },
        None => Identity::Anonymous,
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}
