use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Role;

pub mod password;

pub use password::{hash_password, verify_password, PasswordError};

/// Tokens are valid for a fixed 24 hours.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Invalid JWT token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Signs and verifies HS256 session tokens with a single shared secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        })
    }

    pub fn issue(&self, user_id: &str, username: &str, role: Role) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, username, role))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
