//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::sheet::SheetHandle;

/// Shared application state, cloneable across handlers.
///
/// Holds the configuration and the handle of the one sheet every ingestion
/// request writes to.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sheet: SheetHandle,
}

impl AppState {
    /// Creates a new application state from the given configuration and sheet.
    pub fn new(config: AppConfig, sheet: SheetHandle) -> Self {
        Self {
            config: Arc::new(config),
            sheet,
        }
    }
}
