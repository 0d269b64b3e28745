//! Spreadsheet collaborator.
//!
//! The service only needs three operations from a sheet: count its rows,
//! append a row, and bold a range. `Sheet` abstracts them so that the
//! ingestion pipeline can run against a Google spreadsheet in production and
//! against [`MemorySheet`] in tests.
//!
//! `SheetHandle` is what request handlers hold. It pairs the configured sheet
//! with a header guard so that concurrent first requests write the header row
//! once.

mod google;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{SheetConfig, COLUMN_COUNT, HEADER_ROW};

pub use google::GoogleSheet;
pub use memory::MemorySheet;

/// A single scalar cell value, written to the sheet exactly as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value.into())
    }
}

impl From<f64> for Cell {
    /// Non-finite floats have no JSON representation and become empty.
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Cell::Number)
            .unwrap_or(Cell::Empty)
    }
}

/// A rectangular block of cells, 1-based like A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row: usize,
    pub column: usize,
    pub num_rows: usize,
    pub num_columns: usize,
}

impl CellRange {
    pub fn new(
        row: usize,
        column: usize,
        num_rows: usize,
        num_columns: usize,
    ) -> Result<Self, SheetError> {
        if row == 0 || column == 0 {
            return Err(SheetError::InvalidRange(format!(
                "rows and columns start at 1 (got row {}, column {})",
                row, column
            )));
        }
        if num_rows == 0 || num_columns == 0 {
            return Err(SheetError::InvalidRange("range must not be empty".into()));
        }
        Ok(Self {
            row,
            column,
            num_rows,
            num_columns,
        })
    }

    /// The header row: A1 through the last layout column
    pub fn header() -> Self {
        Self {
            row: 1,
            column: 1,
            num_rows: 1,
            num_columns: COLUMN_COUNT,
        }
    }

    pub fn last_row(&self) -> usize {
        self.row + self.num_rows - 1
    }

    pub fn last_column(&self) -> usize {
        self.column + self.num_columns - 1
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        (self.row..=self.last_row()).contains(&row)
            && (self.column..=self.last_column()).contains(&column)
    }

    /// Render as A1 notation, e.g. `A1:F1`
    pub fn to_a1(&self) -> String {
        format!(
            "{}{}:{}{}",
            column_letters(self.column),
            self.row,
            column_letters(self.last_column()),
            self.last_row()
        )
    }
}

/// Convert a 1-based column index to letters (1 -> A, 27 -> AA)
fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(b'A' + rem as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("Sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Sheets API response: {0}")]
    Decode(String),

    #[error("Sheet is full ({capacity} rows)")]
    QuotaExceeded { capacity: usize },

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    #[error("Sheet configuration error: {0}")]
    Config(String),
}

/// Tabular store that receives the rows
#[async_trait]
pub trait Sheet: Send + Sync {
    /// Short human-readable identity for logs
    fn describe(&self) -> String;

    /// Index of the last non-empty row (0 for an empty sheet)
    async fn row_count(&self) -> Result<usize, SheetError>;

    /// Append one row after the last non-empty row
    async fn append_row(&self, cells: Vec<Cell>) -> Result<(), SheetError>;

    /// Render the cells of `range` in bold
    async fn set_bold(&self, range: CellRange) -> Result<(), SheetError>;
}

/// The configured target sheet, shared by all request handlers
#[derive(Clone)]
pub struct SheetHandle {
    sheet: Arc<dyn Sheet>,
    header_guard: Arc<Mutex<()>>,
}

impl SheetHandle {
    pub fn new(sheet: Arc<dyn Sheet>) -> Self {
        Self {
            sheet,
            header_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Build the sheet described by configuration
    pub fn from_config(config: &SheetConfig) -> Result<Self, SheetError> {
        let sheet: Arc<dyn Sheet> = match config {
            SheetConfig::Memory { capacity } => Arc::new(match capacity {
                Some(capacity) => MemorySheet::with_capacity(*capacity),
                None => MemorySheet::new(),
            }),
            SheetConfig::Google(google) => Arc::new(GoogleSheet::new(google)?),
        };
        Ok(Self::new(sheet))
    }

    pub fn describe(&self) -> String {
        self.sheet.describe()
    }

    /// Write the bold header row if the sheet is empty.
    ///
    /// Returns `true` when this call wrote the header. The check and the write
    /// happen under one lock, so concurrent callers in this process never both
    /// see an empty sheet. Writers in other processes are not covered.
    pub async fn ensure_header(&self) -> Result<bool, SheetError> {
        let _guard = self.header_guard.lock().await;

        if self.sheet.row_count().await? > 0 {
            return Ok(false);
        }

        let header = HEADER_ROW.iter().map(|label| Cell::from(*label)).collect();
        self.sheet.append_row(header).await?;
        self.sheet.set_bold(CellRange::header()).await?;

        tracing::info!(sheet = %self.sheet.describe(), "Wrote header row");
        Ok(true)
    }

    pub async fn append_row(&self, cells: Vec<Cell>) -> Result<(), SheetError> {
        self.sheet.append_row(cells).await
    }
}
