//! Request handler module
//!
//! Responsible for request routing dispatch and the HTML pages. JSON
//! endpoints live in [`crate::api`].

pub mod pages;
pub mod router;
pub mod views;

use crate::store::StoreError;
use hyper::StatusCode;

// Re-export main entry point
pub use router::handle_request;

/// Status answered when a store call fails
pub const fn store_error_status(err: &StoreError) -> StatusCode {
    if err.is_constraint() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
