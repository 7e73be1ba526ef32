use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Builds the full application router: health probe at the root, the REST
/// API nested under `/api`, CORS and request tracing layered on top.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// REST API for programmatic access
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Natural language query endpoint
            .route("/query", post(handlers::query::process_query))
            // Drivers
            .route("/drivers", get(handlers::drivers::list_drivers))
            .route("/drivers", post(handlers::drivers::create_driver))
            .route("/drivers/{id}", get(handlers::drivers::get_driver))
            .route("/drivers/{id}", put(handlers::drivers::update_driver))
            .route("/drivers/{id}", delete(handlers::drivers::delete_driver))
            // Devices
            .route("/devices", get(handlers::devices::list_devices))
            .route("/devices", post(handlers::devices::create_device))
            .route("/devices/{id}", get(handlers::devices::get_device))
            .route("/devices/{id}", put(handlers::devices::update_device))
            .route("/devices/{id}", delete(handlers::devices::delete_device))
            // Positions (append-only telemetry)
            .route("/positions", get(handlers::positions::list_positions))
            .route("/positions", post(handlers::positions::create_position))
            .route("/positions/{id}", get(handlers::positions::get_position)),
    )
}
