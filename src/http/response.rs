//! HTTP response building module
//!
//! Builders for the status codes the service answers with, independent of
//! which handler produced them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE, LOCATION, SERVER};
use hyper::{Response, StatusCode};

pub type HttpResponse = Response<Full<Bytes>>;

/// Build an HTML page with the given status
pub fn build_html_response(status: StatusCode, content: String) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 303 See Other, used after every successful form post
pub fn build_redirect_response(target: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| {
            log_build_error("303", &e);
            Response::new(Full::new(Bytes::from("Redirecting...")))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> HttpResponse {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    if let Ok(value) = HeaderValue::from_str(allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Stamp the configured `Server` header onto a finished response
pub fn with_server_header(mut response: HttpResponse, server_name: &str) -> HttpResponse {
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(SERVER, value);
    }
    response
}

fn plain_text(status: StatusCode, body: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from(body)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
