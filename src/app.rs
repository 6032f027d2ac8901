//! Application state and the HTTP router.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::{DocumentStore, Repository};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, redact_internal_errors};
use crate::services::{AuthService, GuruService, JurnalService, SiswaService};

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, tokens: TokenService, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            store,
        }
    }

    fn repository<T: crate::database::models::Document>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.repository(), self.tokens.clone(), self.config.security.bcrypt_cost)
    }

    pub fn siswa_service(&self) -> SiswaService {
        SiswaService::new(self.repository(), self.repository())
    }

    pub fn guru_service(&self) -> GuruService {
        GuruService::new(self.repository())
    }

    pub fn jurnal_service(&self) -> JurnalService {
        JurnalService::new(self.repository(), self.repository())
    }
}

pub fn router(state: AppState) -> Router {
    let protected = protected_routes().route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), redact_internal_errors))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
        .route("/auth/logout", post(public::auth::logout))
        .route("/jurnal/kebiasaan", get(public::kebiasaan))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(protected::auth::me))
        .route("/jurnal", post(protected::jurnal::create).get(protected::jurnal::list))
        .route("/jurnal/:id", put(protected::jurnal::update))
        .route("/siswa", post(protected::siswa::create).get(protected::siswa::list))
        .route("/siswa/:id", get(protected::siswa::get).put(protected::siswa::update))
        .route("/guru", post(protected::guru::create).get(protected::guru::list))
        .route("/guru/:id", get(protected::guru::get).put(protected::guru::update))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint tidak ditemukan")
}

/// Configured origins, or any origin in development when none are listed.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return if config.is_development() {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        };
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
