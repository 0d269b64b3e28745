//! In-process sheet.
//!
//! Keeps rows and per-cell bold flags behind a lock. Clones share the same
//! rows, so a test can keep a clone to inspect what the service wrote.
//!
//! Like a real spreadsheet, rows with no values do not count: the row count
//! stops at the last row holding a value and the next append lands right
//! after it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Cell, CellRange, Sheet, SheetError};

#[derive(Debug, Clone, Default)]
struct Row {
    cells: Vec<Cell>,
    bold: Vec<bool>,
}

impl Row {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| *cell == Cell::Empty)
    }
}

/// Number of rows up to and including the last non-blank one
fn last_non_empty(rows: &[Row]) -> usize {
    rows.iter()
        .rposition(|row| !row.is_blank())
        .map_or(0, |index| index + 1)
}

#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Arc<RwLock<Vec<Row>>>,
    capacity: Option<usize>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet that rejects appends once it holds `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Snapshot of cell values up to the last non-empty row, top to bottom
    pub async fn rows(&self) -> Vec<Vec<Cell>> {
        let rows = self.rows.read().await;
        rows[..last_non_empty(&rows)]
            .iter()
            .map(|row| row.cells.clone())
            .collect()
    }

    /// Whether the cell at (row, column), 1-based, is bold
    pub async fn is_bold(&self, row: usize, column: usize) -> bool {
        if row == 0 || column == 0 {
            return false;
        }
        self.rows
            .read()
            .await
            .get(row - 1)
            .and_then(|r| r.bold.get(column - 1).copied())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Sheet for MemorySheet {
    fn describe(&self) -> String {
        match self.capacity {
            Some(capacity) => format!("memory (capacity {})", capacity),
            None => "memory".to_string(),
        }
    }

    async fn row_count(&self) -> Result<usize, SheetError> {
        Ok(last_non_empty(&self.rows.read().await))
    }

    async fn append_row(&self, cells: Vec<Cell>) -> Result<(), SheetError> {
        let mut rows = self.rows.write().await;
        let end = last_non_empty(&rows);
        if let Some(capacity) = self.capacity {
            if end >= capacity {
                return Err(SheetError::QuotaExceeded { capacity });
            }
        }
        rows.truncate(end);
        let bold = vec![false; cells.len()];
        rows.push(Row { cells, bold });
        Ok(())
    }

    async fn set_bold(&self, range: CellRange) -> Result<(), SheetError> {
        let mut rows = self.rows.write().await;
        if range.last_row() > rows.len() {
            return Err(SheetError::InvalidRange(format!(
                "{} is past the last row ({})",
                range.to_a1(),
                rows.len()
            )));
        }

        for row in &mut rows[range.row - 1..range.last_row()] {
            if row.bold.len() < range.last_column() {
                row.bold.resize(range.last_column(), false);
            }
            for flag in &mut row.bold[range.column - 1..range.last_column()] {
                *flag = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_keeps_order() {
        let sheet = MemorySheet::new();
        sheet.append_row(vec![Cell::from("first")]).await.unwrap();
        sheet.append_row(vec![Cell::from("second")]).await.unwrap();

        assert_eq!(sheet.row_count().await.unwrap(), 2);
        assert_eq!(
            sheet.rows().await,
            vec![vec![Cell::from("first")], vec![Cell::from("second")]]
        );
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let sheet = MemorySheet::new();
        let observer = sheet.clone();
        sheet.append_row(vec![Cell::from(1)]).await.unwrap();
        assert_eq!(observer.row_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_capacity_exceeded() {
        let sheet = MemorySheet::with_capacity(1);
        sheet.append_row(vec![Cell::from(1)]).await.unwrap();

        let err = sheet.append_row(vec![Cell::from(2)]).await.unwrap_err();
        assert!(matches!(err, SheetError::QuotaExceeded { capacity: 1 }));
        assert_eq!(sheet.row_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_bold_range() {
        let sheet = MemorySheet::new();
        sheet.append_row(vec![Cell::from("a"), Cell::from("b")]).await.unwrap();
        sheet.append_row(vec![Cell::from("c")]).await.unwrap();

        // Formatting may extend past the written cells
        sheet.set_bold(CellRange::new(1, 2, 1, 3).unwrap()).await.unwrap();

        assert!(!sheet.is_bold(1, 1).await);
        assert!(sheet.is_bold(1, 2).await);
        assert!(sheet.is_bold(1, 4).await);
        assert!(!sheet.is_bold(1, 5).await);
        assert!(!sheet.is_bold(2, 2).await);
    }

    #[tokio::test]
    async fn test_set_bold_past_last_row() {
        let sheet = MemorySheet::new();
        let err = sheet.set_bold(CellRange::header()).await.unwrap_err();
        assert!(matches!(err, SheetError::InvalidRange(_)));
    }

    #[tokio::test]
    async fn test_blank_rows_do_not_count() {
        let sheet = MemorySheet::new();
        sheet.append_row(vec![Cell::from("first")]).await.unwrap();
        sheet.append_row(vec![Cell::Empty; 6]).await.unwrap();

        assert_eq!(sheet.row_count().await.unwrap(), 1);
        assert_eq!(sheet.rows().await, vec![vec![Cell::from("first")]]);

        // The next append lands directly after the last value
        sheet.append_row(vec![Cell::from("second")]).await.unwrap();
        assert_eq!(sheet.row_count().await.unwrap(), 2);
        assert_eq!(
            sheet.rows().await,
            vec![vec![Cell::from("first")], vec![Cell::from("second")]]
        );
    }

    #[tokio::test]
    async fn test_sheet_of_blank_rows_gets_header() {
        let sheet = MemorySheet::new();
        sheet.append_row(vec![Cell::Empty; 6]).await.unwrap();
        sheet.append_row(vec![]).await.unwrap();
        assert_eq!(sheet.row_count().await.unwrap(), 0);

        let handle = crate::sheet::SheetHandle::new(Arc::new(sheet.clone()));
        assert!(handle.ensure_header().await.unwrap());

        let rows = sheet.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Cell::from("ID"));
        assert!(sheet.is_bold(1, 1).await);
    }
}
