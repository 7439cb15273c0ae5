//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Record store events
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use writer::LogLevel;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        LogLevel::parse(&config.logging.level),
    )
}

/// Whether lines of `level` pass `logging.level`; `Info` before `init`
fn enabled(level: LogLevel) -> bool {
    writer::get()
        .map_or(LogLevel::Info, writer::LogWriter::level)
        .allows(level)
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("User service started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Database: {}", config.store.path.display()));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    if config.health.enabled {
        let health = &config.health;
        write_info(&format!(
            "Health: {} {} {} {}",
            health.health_path, health.liveness_path, health.readiness_path, health.info_path
        ));
    }
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_store_event(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[Store] {message}"));
    }
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    write_info(&entry.render(format));
}

pub fn log_shutdown(in_flight: usize) {
    if enabled(LogLevel::Info) {
        write_info(&format!(
            "[Shutdown] Stopped accepting connections, {in_flight} still in flight"
        ));
    }
}
