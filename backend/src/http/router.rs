//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and the static front-end fallback.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let realtime = Router::new()
        .route("/hotspots", get(handlers::list_hotspots))
        .route("/predict-click", post(handlers::predict_click))
        .route("/predict-hotspot", post(handlers::predict_hotspot));

    let api = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/stats", get(handlers::get_stats))
        .nest("/realtime", realtime);

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api);

    match state.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => {
            log::info!("Serving front-end from {}", dir.display());
            router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => log::warn!("Static directory {} not found, front-end disabled", dir.display()),
        None => {}
    }

    router
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
