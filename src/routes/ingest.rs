//! Handler for submitted entries.

use axum::{body::Body, extract::State, Json};
use tracing::instrument;

use crate::error::AppError;
use crate::ingest::{ingest, IngestResponse};
use crate::state::AppState;

/// POST handler for the ingestion URL.
///
/// The body is read raw and parsed regardless of `Content-Type`, so clients
/// that post JSON as `text/plain` are accepted. Every outcome, including an
/// oversized body, is answered with a JSON status document.
#[instrument(name = "routes::ingest::submit", skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    body: Body,
) -> Result<Json<IngestResponse>, AppError> {
    let bytes = axum::body::to_bytes(body, state.config.http.max_body_bytes)
        .await
        .map_err(|e| AppError::Body(e.to_string()))?;

    let count = ingest(&state.sheet, &bytes).await?;
    Ok(Json(IngestResponse::success(count)))
}
