//! Configuration loading and constants.
//!
//! Loads application configuration from TOML files and defines the fixed
//! strings of the ingestion contract: the header row, the liveness message and
//! response cache headers. `AppConfig` is the root configuration struct
//! containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Sheet Layout
// =============================================================================

/// Labels written as the first row of an empty sheet
pub const HEADER_ROW: [&str; 6] = [
    "ID",
    "Date",
    "Start Time",
    "End Time",
    "Description",
    "Duration (Hours)",
];

/// Number of columns in every written row
pub const COLUMN_COUNT: usize = HEADER_ROW.len();

/// Last column letter of the fixed layout (A..F)
pub const LAST_COLUMN: &str = "F";

/// A1-notation column span covering the fixed layout
pub const COLUMN_SPAN: &str = formatcp!("A:{}", LAST_COLUMN);

// =============================================================================
// HTTP Responses
// =============================================================================

/// Body returned for GET requests
pub const LIVENESS_MESSAGE: &str = "This web app is active. Use POST to send data.";

/// Ingestion responses describe a write and must never be served from a cache
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// Response header carrying the per-request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Seconds to wait for in-flight requests on shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "tallysheet=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Default Google Sheets API endpoint
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Environment variable consulted when no access token is configured
pub const ACCESS_TOKEN_ENV: &str = "TALLYSHEET_ACCESS_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Target sheet
    pub sheet: SheetConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body in bytes (default: 1 MiB)
    #[serde(default = "HttpServerConfig::default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default)]
    pub tls: TlsConfig,
}

impl HttpServerConfig {
    fn default_max_body_bytes() -> usize {
        1024 * 1024
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain HTTP, for development or behind a TLS-terminating proxy
    #[default]
    None,
    /// Certificate and key files supplied by the operator
    Manual,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub mode: TlsMode,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Which spreadsheet the service writes to
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SheetConfig {
    /// In-process sheet, lost on restart
    Memory {
        /// Maximum number of rows before appends fail
        capacity: Option<usize>,
    },
    /// A tab of a Google spreadsheet
    Google(GoogleSheetConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSheetConfig {
    pub spreadsheet_id: String,
    /// Tab title used in A1 ranges
    #[serde(default = "GoogleSheetConfig::default_sheet_name")]
    pub sheet_name: String,
    /// Numeric tab ID (`gid`) used for formatting requests; looked up from
    /// `sheet_name` when unset
    pub sheet_id: Option<i64>,
    /// OAuth bearer token; falls back to `TALLYSHEET_ACCESS_TOKEN`
    pub access_token: Option<String>,
    #[serde(default = "GoogleSheetConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "GoogleSheetConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl GoogleSheetConfig {
    fn default_sheet_name() -> String {
        "Sheet1".to_string()
    }

    fn default_api_base() -> String {
        DEFAULT_SHEETS_API_BASE.to_string()
    }

    fn default_request_timeout() -> u64 {
        30
    }

    /// Get the effective access token (config value or environment)
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.tls.mode == TlsMode::Manual
            && (self.http.tls.cert_path.is_none() || self.http.tls.key_path.is_none())
        {
            return Err(ConfigError::Validation(
                "http.tls.mode = \"manual\" requires cert_path and key_path".to_string(),
            ));
        }

        if let SheetConfig::Google(google) = &self.sheet {
            if google.spreadsheet_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sheet.spreadsheet_id must not be empty".to_string(),
                ));
            }
            if google.sheet_name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "sheet.sheet_name must not be empty".to_string(),
                ));
            }
        }

        match self.logging.format.to_ascii_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MEMORY_CONFIG: &str = r#"
[http]
host = "127.0.0.1"
port = 8080

[sheet]
backend = "memory"
"#;

    #[test]
    fn test_load_memory_defaults() {
        let config = AppConfig::from_toml(MEMORY_CONFIG).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.max_body_bytes, 1024 * 1024);
        assert_eq!(config.http.tls.mode, TlsMode::None);
        assert!(matches!(config.sheet, SheetConfig::Memory { capacity: None }));
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_google_backend() {
        let config = AppConfig::from_toml(
            r#"
[http]
host = "0.0.0.0"
port = 3000

[sheet]
backend = "google"
spreadsheet_id = "abc123"
sheet_id = 42
access_token = "token"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let SheetConfig::Google(google) = config.sheet else {
            panic!("expected google backend");
        };
        assert_eq!(google.spreadsheet_id, "abc123");
        assert_eq!(google.sheet_name, "Sheet1");
        assert_eq!(google.sheet_id, Some(42));
        assert_eq!(google.api_base, DEFAULT_SHEETS_API_BASE);
        assert_eq!(google.request_timeout_seconds, 30);
        assert_eq!(google.access_token().as_deref(), Some("token"));
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_google_requires_spreadsheet_id() {
        let err = AppConfig::from_toml(
            r#"
[http]
host = "127.0.0.1"
port = 8080

[sheet]
backend = "google"
spreadsheet_id = ""
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_manual_tls_requires_paths() {
        let err = AppConfig::from_toml(
            r#"
[http]
host = "127.0.0.1"
port = 8443

[http.tls]
mode = "manual"
cert_path = "/etc/tallysheet/cert.pem"

[sheet]
backend = "memory"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("cert_path and key_path"));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let err = AppConfig::from_toml(
            r#"
[http]
host = "127.0.0.1"
port = 8080

[sheet]
backend = "excel"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let contents = format!("{}\n[logging]\nformat = \"xml\"\n", MEMORY_CONFIG);
        let err = AppConfig::from_toml(&contents).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MEMORY_CONFIG.as_bytes()).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.host, "127.0.0.1");
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/tallysheet.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_column_span_matches_header() {
        assert_eq!(COLUMN_COUNT, 6);
        assert_eq!(COLUMN_SPAN, "A:F");
    }
}
