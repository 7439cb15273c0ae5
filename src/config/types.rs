// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::store::DEFAULT_BUSY_TIMEOUT;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections on shutdown
    pub shutdown_grace: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Record store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Path of the SQLite database file
    pub path: PathBuf,
    /// SQLite busy timeout; 0 falls back to the store default
    pub busy_timeout_ms: u64,
    /// Delete the database file before opening it
    pub reset_on_start: bool,
    /// Insert the demo users when the table is empty
    pub seed_sample_data: bool,
    /// Expose `POST /reset`
    pub allow_reset: bool,
}

impl StoreConfig {
    pub const fn busy_timeout(&self) -> Duration {
        if self.busy_timeout_ms == 0 {
            DEFAULT_BUSY_TIMEOUT
        } else {
            Duration::from_millis(self.busy_timeout_ms)
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Health summary path with version and pod name (default: /health)
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Liveness probe path (default: /live)
    #[serde(default = "default_live_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /ready)
    #[serde(default = "default_ready_path")]
    pub readiness_path: String,
    /// Build/deployment info path (default: /info)
    #[serde(default = "default_info_path")]
    pub info_path: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,
    #[serde(default = "default_pod_name")]
    pub pod_name: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_path() -> String {
    "/health".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_live_path() -> String {
    "/live".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_ready_path() -> String {
    "/ready".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_info_path() -> String {
    "/info".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_pod_name() -> String {
    "unknown".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            health_path: default_health_path(),
            liveness_path: default_live_path(),
            readiness_path: default_ready_path(),
            info_path: default_info_path(),
            app_version: default_app_version(),
            pod_name: default_pod_name(),
        }
    }
}
