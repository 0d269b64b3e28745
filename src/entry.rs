//! Wire types for submitted time-tracking entries.
//!
//! Entries are transcribed verbatim: fields keep the JSON scalar they arrived
//! as, and absent fields become empty cells.

use serde::Deserialize;

use crate::sheet::Cell;

/// Body of an ingestion request
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    pub entries: Vec<Entry>,
}

/// One time-tracking record, destined for one sheet row
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    pub id: Cell,
    pub date: Cell,
    pub start_time: Cell,
    pub end_time: Cell,
    pub description: Cell,
    /// Hours, as supplied; never recomputed from start/end
    pub duration: Cell,
}

impl Entry {
    /// Cells in sheet column order: id, date, start, end, description, duration.
    pub fn into_row(self) -> Vec<Cell> {
        vec![
            self.id,
            self.date,
            self.start_time,
            self.end_time,
            self.description,
            self.duration,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COLUMN_COUNT;

    #[test]
    fn test_parse_full_entry() {
        let request: IngestRequest = serde_json::from_str(
            r#"{"entries":[{"id":17,"date":"2024-03-01","startTime":"09:00","endTime":"10:30","description":"Standup","duration":1.5}]}"#,
        )
        .unwrap();

        assert_eq!(request.entries.len(), 1);
        let row = request.entries[0].clone().into_row();
        assert_eq!(row.len(), COLUMN_COUNT);
        assert_eq!(row[0], Cell::from(17));
        assert_eq!(row[1], Cell::from("2024-03-01"));
        assert_eq!(row[2], Cell::from("09:00"));
        assert_eq!(row[3], Cell::from("10:30"));
        assert_eq!(row[4], Cell::from("Standup"));
        assert_eq!(row[5], Cell::from(1.5));
    }

    #[test]
    fn test_missing_fields_become_empty_cells() {
        let request: IngestRequest =
            serde_json::from_str(r#"{"entries":[{"id":"a1","duration":2}]}"#).unwrap();

        let row = request.entries[0].clone().into_row();
        assert_eq!(row[0], Cell::from("a1"));
        assert_eq!(row[1], Cell::Empty);
        assert_eq!(row[4], Cell::Empty);
        assert_eq!(row[5], Cell::from(2));
    }

    #[test]
    fn test_values_are_not_coerced() {
        // Strings stay strings even when they look numeric
        let request: IngestRequest = serde_json::from_str(
            r#"{"entries":[{"id":"007","date":20240301,"duration":"1.25","description":true}]}"#,
        )
        .unwrap();

        let entry = &request.entries[0];
        assert_eq!(entry.id, Cell::from("007"));
        assert_eq!(entry.date, Cell::from(20240301));
        assert_eq!(entry.duration, Cell::from("1.25"));
        assert_eq!(entry.description, Cell::Bool(true));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let request: IngestRequest =
            serde_json::from_str(r#"{"entries":[{"id":1,"project":"x"}],"client":"phone"}"#)
                .unwrap();
        assert_eq!(request.entries[0].id, Cell::from(1));
    }

    #[test]
    fn test_missing_entries_rejected() {
        let err = serde_json::from_str::<IngestRequest>(r#"{"items":[]}"#).unwrap_err();
        assert!(err.to_string().contains("entries"));
    }

    #[test]
    fn test_non_array_entries_rejected() {
        assert!(serde_json::from_str::<IngestRequest>(r#"{"entries":{"id":1}}"#).is_err());
        assert!(serde_json::from_str::<IngestRequest>(r#"{"entries":null}"#).is_err());
    }

    #[test]
    fn test_nested_values_rejected() {
        assert!(
            serde_json::from_str::<IngestRequest>(r#"{"entries":[{"id":{"nested":1}}]}"#).is_err()
        );
        assert!(serde_json::from_str::<IngestRequest>(r#"{"entries":[{"tags":1,"date":[1]}]}"#)
            .is_err());
    }
}
