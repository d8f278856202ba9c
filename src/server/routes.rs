//! Route definitions for the API server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Creates the main application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // The dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/forecast", get(handlers::get_forecast))
        .route("/forecast/batch", post(handlers::batch_forecast))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
