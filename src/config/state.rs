// Application state module
// Everything a handler needs, passed explicitly into every request

use chrono::{DateTime, Local};

use super::types::Config;
use crate::logger::AccessLogFormat;
use crate::store::Store;

/// Application state shared by all connections
pub struct AppState {
    pub config: Config,
    pub store: Store,
    /// Parsed once from `logging.access_log_format`
    pub access_log_format: AccessLogFormat,
    pub started_at: DateTime<Local>,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);

        Self {
            config,
            store,
            access_log_format,
            started_at: Local::now(),
        }
    }
}
