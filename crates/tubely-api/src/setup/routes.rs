//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::auth::auth_middleware;
use crate::constants::{API_PREFIX, ASSETS_PREFIX};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::constants::MULTIPART_OVERHEAD_BYTES;
use tubely_core::{Config, StorageBackend};
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes(config)
        .route_layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    let mut app = public_routes().merge(protected_routes).with_state(state);

    if config.storage_backend() == StorageBackend::Local {
        if let Some(path) = config.local_storage_path() {
            tracing::info!(path = %path, mount = ASSETS_PREFIX, "Serving local storage");
            app = app.nest_service(ASSETS_PREFIX, ServeDir::new(path));
        }
    }

    Ok(app.layer(cors).layer(TraceLayer::new_for_http()))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
}

fn protected_routes(config: &Config) -> Router<Arc<AppState>> {
    // Axum's default limit is replaced by an outer ceiling that leaves room for multipart
    // framing; the upload pipeline enforces the exact byte count on the file itself.
    let body_limit = config
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let upload_routes = Router::new()
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_PREFIX),
            put(handlers::video_upload::upload_video),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::video_get::get_video),
        )
        .merge(upload_routes)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
