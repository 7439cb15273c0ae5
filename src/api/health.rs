// Health endpoints module
// Health summary, liveness, readiness (store ping) and pod info for container probes

use chrono::Local;
use hyper::StatusCode;
use serde::Serialize;
use std::path::Path;

use super::response::json_response;
use crate::config::AppState;
use crate::http::HttpResponse;
use crate::logger;

/// Where the kernel and the distro keep the machine name, in lookup order
const HOSTNAME_FILES: [&str; 2] = ["/proc/sys/kernel/hostname", "/etc/hostname"];

#[derive(Serialize)]
struct Summary<'a> {
    status: &'static str,
    timestamp: String,
    version: &'a str,
    pod_name: &'a str,
}

#[derive(Serialize)]
struct Probe {
    status: &'static str,
}

#[derive(Serialize)]
struct Info<'a> {
    message: &'static str,
    timestamp: String,
    version: &'a str,
    pod_name: &'a str,
    host: String,
    uptime_seconds: i64,
}

/// Health summary; never touches the store
pub fn health(state: &AppState) -> HttpResponse {
    json_response(
        StatusCode::OK,
        &Summary {
            status: "healthy",
            timestamp: Local::now().to_rfc3339(),
            version: &state.config.health.app_version,
            pod_name: &state.config.health.pod_name,
        },
    )
}

/// Liveness probe; answers as long as the process serves requests
pub fn liveness() -> HttpResponse {
    json_response(StatusCode::OK, &Probe { status: "alive" })
}

/// Readiness probe; 503 while the store cannot answer
pub fn readiness(state: &AppState) -> HttpResponse {
    match state.store.ping() {
        Ok(()) => json_response(StatusCode::OK, &Probe { status: "ready" }),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            json_response(
                StatusCode::SERVICE_UNAVAILABLE,
                &Probe {
                    status: "unavailable",
                },
            )
        }
    }
}

pub fn info(state: &AppState) -> HttpResponse {
    let now = Local::now();
    json_response(
        StatusCode::OK,
        &Info {
            message: "Hello from the user service!",
            timestamp: now.to_rfc3339(),
            version: &state.config.health.app_version,
            pod_name: &state.config.health.pod_name,
            host: hostname(),
            uptime_seconds: (now - state.started_at).num_seconds(),
        },
    )
}

/// Machine hostname: kernel/distro files first, then `HOSTNAME`, else "unknown"
fn hostname() -> String {
    hostname_from_files(HOSTNAME_FILES.iter().map(Path::new))
        .or_else(|| {
            std::env::var("HOSTNAME")
                .ok()
                .filter(|h| !h.trim().is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// First non-blank, trimmed file content among `paths`
fn hostname_from_files<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<String> {
    paths.into_iter().find_map(|path| {
        std::fs::read_to_string(path)
            .ok()
            .map(|content| content.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}
