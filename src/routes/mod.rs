//! HTTP routes.
//!
//! `/` takes entries on POST and answers GET with a liveness message;
//! `/health` is a health check for supervisors. Ingestion responses are marked
//! `no-store` so intermediaries never replay a write acknowledgment.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod ingest;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let ingest_routes = Router::new()
        .route("/", get(health::liveness).post(ingest::submit))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    // Health check - no caching, always fresh for liveness checks
    let health_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .merge(ingest_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
