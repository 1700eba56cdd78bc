//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and the static file fallback.

use std::path::Path;

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

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Create the main application router.
///
/// Paths outside `/api` are served from `public_dir`.
pub fn create_router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/airports", get(handlers::search_airports))
        .route("/flightPaths/{from}/{to}", get(handlers::search_flight_paths))
        .route("/hotel/{description}", get(handlers::search_hotels))
        .route("/hotel/{description}/", get(handlers::search_hotels))
        .route("/hotel/{description}/{location}", get(handlers::search_hotels))
        .route("/hotel/{description}/{location}/", get(handlers::search_hotels))
        .route("/user/login", post(handlers::user_login))
        .route("/user/signup", post(handlers::user_signup))
        .route(
            "/user/{username}/flights",
            get(handlers::user_flights).post(handlers::book_flights),
        );

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
