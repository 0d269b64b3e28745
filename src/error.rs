use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ingest::IngestResponse;
use crate::sheet::SheetError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("Invalid request body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// A row append failed; rows before `index` were already written.
    #[error("Failed to append entry {} of {} ({} rows written): {}", .index + 1, .total, .index, .source)]
    Append {
        index: usize,
        total: usize,
        source: SheetError,
    },
}

/// Every failure is reported in-band: HTTP 200 with an error status body.
/// Callers tell success from failure by the `status` field alone.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Body(_) | AppError::Parse(_) => {
                tracing::warn!(error = %self, "Rejected malformed ingestion request");
            }
            AppError::Sheet(_) | AppError::Append { .. } => {
                tracing::error!(error = %self, "Sheet write failed");
            }
        }

        (StatusCode::OK, Json(IngestResponse::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_error_message_counts_written_rows() {
        let err = AppError::Append {
            index: 2,
            total: 5,
            source: SheetError::QuotaExceeded { capacity: 3 },
        };
        assert_eq!(
            err.to_string(),
            "Failed to append entry 3 of 5 (2 rows written): Sheet is full (3 rows)"
        );
    }

    #[test]
    fn test_error_response_is_ok_status() {
        let response = AppError::Body("stream closed".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
