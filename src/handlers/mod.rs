// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth via `jwt_auth_middleware`).
// Handlers stay thin: extract, call a service, wrap the result.

pub mod protected;
pub mod public;

use crate::app::AppState;
use crate::error::ApiError;
use crate::filter::{Page, PageRequest};
use serde::Serialize;
use serde_json::Value;

/// Resolve `page`/`limit` query values against the configured limits.
pub(crate) fn page_request(state: &AppState, page: &Option<String>, limit: &Option<String>) -> PageRequest {
    let pagination = &state.config.pagination;
    PageRequest::parse(
        page.as_deref(),
        limit.as_deref(),
        pagination.default_limit,
        pagination.max_limit,
    )
}

/// `{<items_key>: [...], pagination: {...}}`
pub(crate) fn list_body<T: Serialize>(page: &Page<T>, items_key: &str, total_key: &str) -> Result<Value, ApiError> {
    page.to_json(items_key, total_key).map_err(|e| {
        tracing::error!("Failed to serialize {} page: {}", items_key, e);
        ApiError::internal_server_error(e.to_string())
    })
}
