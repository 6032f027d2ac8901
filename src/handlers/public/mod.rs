// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod auth;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::DATABASE_UNAVAILABLE;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::jurnal_service::KebiasaanList;
use crate::services::JurnalService;

pub const SERVICE_NAME: &str = "Jurnal Digital SMKN 4 Jakarta";

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "REST API jurnal harian 7 Kebiasaan Anak Indonesia Hebat",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login, /auth/logout (public), /auth/me (protected)",
                "kebiasaan": "/jurnal/kebiasaan (public)",
                "jurnal": "/jurnal[/:id] (protected)",
                "siswa": "/siswa[/:id] (protected)",
                "guru": "/guru[/:id] (protected)"
            }
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "healthy",
                    "timestamp": now,
                    "service": SERVICE_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": DATABASE_UNAVAILABLE,
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "service": SERVICE_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}

/// GET /jurnal/kebiasaan
pub async fn kebiasaan() -> ApiResult<KebiasaanList> {
    Ok(ApiResponse::success(JurnalService::habits()))
}
