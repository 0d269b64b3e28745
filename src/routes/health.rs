//! Liveness endpoints.
//!
//! Neither handler reads the request or touches the sheet, so they answer as
//! long as the process can serve HTTP.

use crate::config::LIVENESS_MESSAGE;

/// GET on the ingestion URL: tells a person with a browser the endpoint is up.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check for process supervisors and load balancers.
pub async fn health() -> &'static str {
    "ok"
}
