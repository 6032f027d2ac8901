// handlers/public/auth.rs - Token acquisition endpoints

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{AuthPayload, LoginInput, RegisterInput};
use crate::validation::ValidatedJson;

/// POST /auth/register - create an account and return a session token
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth_service().register(input).await?;
    Ok(ApiResponse::created(payload).with_message("User berhasil didaftarkan"))
}

/// POST /auth/login - username or email plus password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> ApiResult<AuthPayload> {
    let payload = state.auth_service().login(input).await?;
    Ok(ApiResponse::success(payload).with_message("Login berhasil"))
}

/// POST /auth/logout - tokens are stateless, the client discards its copy
pub async fn logout() -> ApiResult<()> {
    Ok(ApiResponse::message("Logout berhasil"))
}
