use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::error::{ApiError, InternalErrorMarker, SERVER_ERROR_MESSAGE};

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status_code: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::success(data).with_status(StatusCode::CREATED)
    }

    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        if let Some(message) = self.message {
            envelope.insert("message".into(), Value::String(message));
        }

        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    envelope.insert("data".into(), value);
                }
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return ApiError::internal_server_error(e.to_string()).into_response();
                }
            }
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Replace 500 bodies with the generic message unless debug output is on.
pub async fn redact_internal_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if state.config.security.debug_errors || response.extensions().get::<InternalErrorMarker>().is_none() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    let body = json!({
        "success": false,
        "message": SERVER_ERROR_MESSAGE,
        "code": "INTERNAL_SERVER_ERROR"
    });
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let bytes = serde_json::to_vec(&body).unwrap_or_default();
    Response::from_parts(parts, Body::from(bytes))
}
