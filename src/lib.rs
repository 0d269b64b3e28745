//! Tallysheet: an HTTP endpoint that appends time-tracking entries to a
//! spreadsheet.
//!
//! POST a JSON document `{"entries": [...]}` and each entry becomes one row;
//! the sheet gets a bold header row the first time it is written. Every POST
//! is answered with HTTP 200 and a `{"status", "message"}` body.

pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod ingest;
pub mod middleware;
pub mod routes;
pub mod sheet;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
