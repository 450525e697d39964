//! Defines routes for the catalog and image streaming API.
//!
//! ## Structure
//! - **API endpoints** (nested under `/api`)
//!   - `GET  /api/isos` — catalog of bootable images (JSON)
//!   - `GET  /api/iso/{*file_name}` — stream an image, honoring `Range`
//!   - `HEAD /api/iso/{*file_name}` — headers only
//!   - anything else under `/api` — JSON 404
//!
//! - **Health endpoints** (mounted at root): `/healthz`, `/readyz`
//!
//! - **Everything else** falls through to static asset serving.
//!
//! The wildcard `*file_name` captures the rest of the path, percent-decoded;
//! keys that are not a single flat name are answered with 404.

use crate::{
    errors::AppError,
    handlers::{
        blob_handlers::{get_iso, head_iso},
        catalog_handlers::list_isos,
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::get,
};
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Build the API and health routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .route("/isos", get(list_isos))
        .route("/iso/{*file_name}", get(get_iso).head(head_iso))
        .fallback(api_not_found);

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api)
}

/// Full application: API routes, static fallback, CORS and request tracing.
pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    routes()
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin may read the API, send `Range`, and see the range headers.
pub fn cors_layer() -> CorsLayer {
    const EXPOSED: [HeaderName; 3] = [
        header::ACCEPT_RANGES,
        header::CONTENT_RANGE,
        header::CONTENT_LENGTH,
    ];

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::RANGE, header::CONTENT_TYPE])
        .expose_headers(EXPOSED)
}

async fn api_not_found() -> AppError {
    AppError::not_found("Not Found")
}
