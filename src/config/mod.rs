// Configuration module entry point
// Manages application configuration and the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
#[cfg(test)]
pub use state::test_support;
pub use types::Config;

type Builder = config::builder::ConfigBuilder<config::builder::DefaultState>;

/// Prefix for `USERBOOK_SECTION__KEY` style environment overrides
const ENV_PREFIX: &str = "USERBOOK";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        Self::with_defaults(builder)?
            // Container conventions used by the health-check deployments
            .set_override_option("server.port", env_var("PORT"))?
            .set_override_option("health.app_version", env_var("APP_VERSION"))?
            .set_override_option("health.pod_name", env_var("POD_NAME"))?
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only; no file and no environment
    #[cfg(test)]
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    fn with_defaults(builder: Builder) -> Result<Builder, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 10)?
            .set_default("http.server_name", "Tokio-Hyper/1.0")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("store.path", "users.db")?
            .set_default("store.busy_timeout_ms", 5000)?
            .set_default("store.reset_on_start", false)?
            .set_default("store.seed_sample_data", false)?
            .set_default("store.allow_reset", false)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Non-empty environment variable, `None` when unset or blank
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
