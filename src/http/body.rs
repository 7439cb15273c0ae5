//! Request body helpers
//!
//! Reads bodies under the configured size limit and decodes
//! `application/x-www-form-urlencoded` submissions.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use thiserror::Error;

use crate::validation::UserInput;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Read(String),
}

/// Collect the whole body, failing once more than `limit` bytes arrive
pub async fn read_limited<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(BodyError::TooLarge { limit })
        }
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}

/// Decode `name` and `email` from a urlencoded form; absent fields stay empty
pub fn parse_user_form(body: &[u8]) -> UserInput {
    let mut input = UserInput::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "name" => input.name = value.into_owned(),
            "email" => input.email = value.into_owned(),
            _ => {}
        }
    }
    input
}
