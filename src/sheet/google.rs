//! Google Sheets REST backend.
//!
//! Talks to the Sheets API v4 with a bearer token:
//! - row count: `GET values/{tab}` over the whole tab, so data in any column
//!   counts; the API trims trailing empty rows, so the number of returned rows
//!   is the last non-empty row
//! - append: `POST values/{tab}!A:F:append` with `valueInputOption=RAW` so
//!   values are stored as sent, never parsed as formulas or dates
//! - bold: `POST :batchUpdate` with a `repeatCell` request. Formatting
//!   addresses tabs by numeric ID, so when none is configured it is resolved
//!   once from the tab title via the spreadsheet metadata.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::instrument;

use super::{Cell, CellRange, Sheet, SheetError};
use crate::config::{GoogleSheetConfig, ACCESS_TOKEN_ENV, COLUMN_SPAN};

/// Partial response mask for the tab lookup
const SHEET_PROPERTIES_FIELDS: &str = "sheets.properties(sheetId,title)";

pub struct GoogleSheet {
    client: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    sheet_id: OnceCell<i64>,
    access_token: String,
}

/// `ValueRange` resource; `values` is omitted when the range is empty
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Debug, Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    /// Omitted from responses when 0
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GoogleSheet {
    pub fn new(config: &GoogleSheetConfig) -> Result<Self, SheetError> {
        let access_token = config.access_token().ok_or_else(|| {
            SheetError::Config(format!(
                "no access token: set sheet.access_token or {}",
                ACCESS_TOKEN_ENV
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            sheet_id: OnceCell::new_with(config.sheet_id),
            access_token,
        })
    }

    /// A1 range naming the whole tab, e.g. `'Sheet1'`
    fn tab_range(&self) -> String {
        format!("'{}'", self.sheet_name.replace('\'', "''"))
    }

    /// A1 range covering the fixed columns of this tab, e.g. `'Sheet1'!A:F`
    fn column_range(&self) -> String {
        format!("{}!{}", self.tab_range(), COLUMN_SPAN)
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}",
            self.api_base,
            urlencoding::encode(&self.spreadsheet_id)
        )
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(range)
        )
    }

    /// Numeric ID of the configured tab, looked up by title on first use.
    async fn sheet_id(&self) -> Result<i64, SheetError> {
        self.sheet_id
            .get_or_try_init(|| self.lookup_sheet_id())
            .await
            .copied()
    }

    #[instrument(
        name = "sheet.google.lookup_sheet_id",
        skip(self),
        fields(spreadsheet = %self.spreadsheet_id, sheet = %self.sheet_name)
    )]
    async fn lookup_sheet_id(&self) -> Result<i64, SheetError> {
        let response = self
            .client
            .get(format!(
                "{}?fields={}",
                self.spreadsheet_url(),
                urlencoding::encode(SHEET_PROPERTIES_FIELDS)
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let metadata: SpreadsheetMetadata = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetError::Decode(e.to_string()))?;

        let sheet_id = metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties)
            .find(|properties| properties.title == self.sheet_name)
            .map(|properties| properties.sheet_id)
            .ok_or_else(|| {
                SheetError::Config(format!(
                    "spreadsheet {} has no tab titled \"{}\"",
                    self.spreadsheet_id, self.sheet_name
                ))
            })?;

        tracing::debug!(sheet_id, "Resolved tab ID");
        Ok(sheet_id)
    }

    /// Turn a non-2xx response into `SheetError::Api`, preferring the message
    /// from Google's error envelope over the raw body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SheetError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body
                }
            });

        Err(SheetError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Sheet for GoogleSheet {
    fn describe(&self) -> String {
        format!("google:{}/{}", self.spreadsheet_id, self.sheet_name)
    }

    #[instrument(
        name = "sheet.google.row_count",
        skip(self),
        fields(spreadsheet = %self.spreadsheet_id, duration_ms)
    )]
    async fn row_count(&self) -> Result<usize, SheetError> {
        let start = Instant::now();

        let response = self
            .client
            .get(format!(
                "{}?majorDimension=ROWS",
                self.values_url(&self.tab_range())
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let range: ValueRange = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetError::Decode(e.to_string()))?;

        tracing::Span::current().record("duration_ms", start.elapsed().as_millis() as u64);
        Ok(range.values.len())
    }

    #[instrument(
        name = "sheet.google.append_row",
        skip(self, cells),
        fields(spreadsheet = %self.spreadsheet_id, duration_ms)
    )]
    async fn append_row(&self, cells: Vec<Cell>) -> Result<(), SheetError> {
        let start = Instant::now();

        let response = self
            .client
            .post(format!(
                "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
                self.values_url(&self.column_range())
            ))
            .bearer_auth(&self.access_token)
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [cells],
            }))
            .send()
            .await?;
        Self::check(response).await?;

        tracing::Span::current().record("duration_ms", start.elapsed().as_millis() as u64);
        Ok(())
    }

    #[instrument(
        name = "sheet.google.set_bold",
        skip(self, range),
        fields(spreadsheet = %self.spreadsheet_id, range = %range.to_a1())
    )]
    async fn set_bold(&self, range: CellRange) -> Result<(), SheetError> {
        let sheet_id = self.sheet_id().await?;

        // GridRange is zero-based with exclusive end indexes
        let request = json!({
            "requests": [{
                "repeatCell": {
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": range.row - 1,
                        "endRowIndex": range.last_row(),
                        "startColumnIndex": range.column - 1,
                        "endColumnIndex": range.last_column(),
                    },
                    "cell": {
                        "userEnteredFormat": { "textFormat": { "bold": true } }
                    },
                    "fields": "userEnteredFormat.textFormat.bold",
                }
            }]
        });

        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
