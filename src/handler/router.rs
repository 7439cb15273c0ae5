//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for body size checks,
//! route matching, dispatching, and the access log.

use crate::api;
use crate::config::AppState;
use crate::handler::{pages, views};
use crate::http::{self, BodyError, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{match_route, Route, RouteMatch};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Method, Request, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    // 1. Log headers if enabled
    logger::log_headers_count(parts.headers.len(), state.config.logging.show_headers);

    // 2. Check declared body size, then route
    let response = match check_body_size(&parts.headers, state.config.http.max_body_size) {
        Some(resp) => resp,
        None => dispatch(&parts.method, parts.uri.path(), body, &state).await,
    };
    let response = http::with_server_header(response, &state.config.http.server_name);

    // 3. Access log
    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.to_string(),
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(&parts.headers, &REFERER);
        entry.user_agent = header_string(&parts.headers, &USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Resolve the route, read the body under the size limit, and run the handler
///
/// Handlers call into the synchronous store, so they run on the blocking pool
/// and a store call waiting on a locked database never stalls other requests.
async fn dispatch<B>(method: &Method, path: &str, body: B, state: &Arc<AppState>) -> HttpResponse
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let route = match match_route(method, path, &state.config) {
        RouteMatch::Matched(route) => route,
        RouteMatch::MethodNotAllowed(allow) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response(&allow);
        }
        RouteMatch::NotFound => return http::build_404_response(),
    };

    let limit = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);
    let body = match http::read_limited(body, limit).await {
        Ok(bytes) => bytes,
        Err(e @ BodyError::TooLarge { .. }) => {
            logger::log_error(&e.to_string());
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&e.to_string());
            return http::build_html_response(
                StatusCode::BAD_REQUEST,
                views::render_error("Failed to read request body"),
            );
        }
    };

    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || run_route(route, &state, &body)).await {
        Ok(response) => response,
        Err(e) => {
            logger::log_error(&format!("Handler for {method} {path} failed: {e}"));
            http::build_html_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                views::render_error("Internal server error"),
            )
        }
    }
}

fn run_route(route: Route, state: &AppState, body: &[u8]) -> HttpResponse {
    match route {
        Route::ListUsers => pages::list_users(state),
        Route::AddForm => pages::add_form(),
        Route::AddUser => pages::add_user(state, body),
        Route::EditForm(id) => pages::edit_form(state, &id),
        Route::EditUser(id) => pages::edit_user(state, &id, body),
        Route::DeleteUser(id) => pages::delete_user(state, &id),
        Route::Reset => pages::reset_store(state),
        Route::ApiListUsers => api::handlers::list_users(state),
        Route::ApiCreateUser => api::handlers::create_user(state, body),
        Route::ApiDeleteUser(id) => api::handlers::delete_user(state, &id),
        Route::Health => api::health::health(state),
        Route::Liveness => api::health::liveness(),
        Route::Readiness => api::health::readiness(state),
        Route::Info => api::health::info(state),
    }
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
