//! Axum router configuration with middleware.
//!
//! Routes match the paths the original service exposed, so existing
//! Twilio webhook configuration keeps working unchanged.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/initialize", post(handlers::agent::initialize))
        .route("/stop", post(handlers::agent::stop))
        .route("/api/whatsapp", post(handlers::whatsapp::receive))
        .route("/health", get(handlers::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
