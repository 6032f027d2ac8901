use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /auth/me - account behind the bearer token
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<UserSummary> {
    let summary = state.auth_service().current_user(&user.user_id).await?;
    Ok(ApiResponse::success(summary))
}
