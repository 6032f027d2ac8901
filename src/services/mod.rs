pub mod auth_service;
pub mod guru_service;
pub mod jurnal_service;
pub mod siswa_service;

pub use auth_service::AuthService;
pub use guru_service::GuruService;
pub use jurnal_service::JurnalService;
pub use siswa_service::SiswaService;

use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::database::DatabaseError;
use crate::types::ObjectId;

/// Domain failures, translated to HTTP responses by [`crate::error::ApiError`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },

    /// Duplicate account or registry number.
    #[error("{0}")]
    AlreadyExists(String),

    /// Duplicate journal entry.
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn invalid(field: &str, message: &str) -> Self {
        ServiceError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Path ids that are not shaped like an id can never match a record.
pub(crate) fn parse_path_id(id: &str, not_found: &str) -> Result<ObjectId, ServiceError> {
    id.parse()
        .map_err(|_| ServiceError::NotFound(not_found.to_string()))
}

/// Trimmed value of an optional query parameter, `None` when blank.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A field that passed `required` validation.
pub(crate) fn take(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Optional text, with blank strings stored as null.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
