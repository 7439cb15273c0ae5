//! HTTP protocol layer module
//!
//! Response builders and body decoding shared by the HTML and JSON handlers.

pub mod body;
pub mod response;

// Re-export commonly used items
pub use body::{parse_user_form, read_limited, BodyError};
pub use response::{
    build_404_response, build_405_response, build_413_response, build_html_response,
    build_redirect_response, with_server_header, HttpResponse,
};
