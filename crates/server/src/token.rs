//! Token service: issues and verifies the bearer credentials that carry a
//! user identity between requests.
//!
//! One shared secret, fixed 1-hour expiry, no refresh and no revocation —
//! expiry is the only invalidation path.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenService {
    secret: Vec<u8>,
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a credential for the given user. Pure function of secret,
    /// claims, and clock.
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        let expiration = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: user_id.to_owned(),
            email: email.to_owned(),
            exp: expiration.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))
    }

    /// Decode and check a credential. Malformed input, a bad signature, and
    /// a past expiry all resolve to the same definite rejection.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ApiError::unauthenticated())
    }
}
