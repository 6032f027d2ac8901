// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::{PasswordError, TokenError};
use crate::database::DatabaseError;
use crate::services::ServiceError;

pub const SERVER_ERROR_MESSAGE: &str = "Terjadi kesalahan server";
pub const DATABASE_UNAVAILABLE: &str = "Database tidak tersedia";

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        errors: Vec<FieldViolation>,
    },
    InvalidJson(String),
    AlreadyRegistered(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        detail: Option<String>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::AlreadyRegistered(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::AlreadyRegistered(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code()
        });

        match self {
            ApiError::ValidationError { errors, .. } => {
                response["errors"] = json!(errors);
            }
            ApiError::InternalServerError { detail: Some(detail), .. } => {
                response["error"] = json!(detail);
            }
            _ => {}
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(errors: Vec<FieldViolation>) -> Self {
        ApiError::ValidationError {
            message: "Validation error".to_string(),
            errors,
        }
    }

    /// Shorthand for a single-field violation.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation_error(vec![FieldViolation::new(field, message)])
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn already_registered(message: impl Into<String>) -> Self {
        ApiError::AlreadyRegistered(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: SERVER_ERROR_MESSAGE.to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => {
                tracing::warn!("Unique constraint rejected write: {}", msg);
                ApiError::conflict(msg)
            }
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable(DATABASE_UNAVAILABLE)
            }
            DatabaseError::QueryError(msg) => {
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error(msg)
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error(sqlx_err.to_string())
            }
            DatabaseError::Serialization(e) => {
                tracing::error!("Document serialization error: {}", e);
                ApiError::internal_server_error(e.to_string())
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid { field, message } => ApiError::invalid_field(field, message),
            ServiceError::AlreadyExists(msg) => ApiError::already_registered(msg),
            ServiceError::Duplicate(msg) => ApiError::conflict(msg),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::InvalidCredentials => {
                ApiError::unauthorized("Username atau password salah")
            }
            ServiceError::Database(e) => e.into(),
            ServiceError::Token(e) => e.into(),
            ServiceError::Password(e) => e.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(e) => {
                tracing::error!("Token signing failed: {}", e);
                ApiError::internal_server_error(e.to_string())
            }
            TokenError::Invalid(_) | TokenError::MissingSecret => {
                ApiError::unauthorized("Token tidak valid")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing failed: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let mut response = (status, Json(self.to_json())).into_response();
        // Marker so the debug-redaction layer can find bodies carrying detail.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(InternalErrorMarker);
        }
        response
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InternalErrorMarker;
