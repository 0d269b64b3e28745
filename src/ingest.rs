//! Entry ingestion pipeline.
//!
//! Parses a request body, makes sure the sheet has its header row, then
//! appends one row per entry in submission order. Rows are never deduplicated
//! and a failure partway through leaves earlier rows in place.

use serde::Serialize;
use tracing::instrument;

use crate::entry::IngestRequest;
use crate::error::AppError;
use crate::sheet::SheetHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// JSON body returned for every ingestion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestResponse {
    pub status: Status,
    pub message: String,
}

impl IngestResponse {
    pub fn success(count: usize) -> Self {
        Self {
            status: Status::Success,
            message: format!("Added {} entries.", count),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

/// Append the entries in `body` to `sheet`, returning how many were written.
#[instrument(name = "ingest", skip_all, fields(bytes = body.len(), entries))]
pub async fn ingest(sheet: &SheetHandle, body: &[u8]) -> Result<usize, AppError> {
    let request: IngestRequest = serde_json::from_slice(body)?;
    let total = request.entries.len();
    tracing::Span::current().record("entries", total);

    sheet.ensure_header().await?;

    for (index, entry) in request.entries.into_iter().enumerate() {
        sheet
            .append_row(entry.into_row())
            .await
            .map_err(|source| AppError::Append {
                index,
                total,
                source,
            })?;
    }

    tracing::info!(count = total, "Appended entries");
    Ok(total)
}
