//! Input validation performed before any store call

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name and email are required")]
    MissingFields,
    #[error("Invalid user ID: {0:?}")]
    InvalidId(String),
}

/// Name/email pair as submitted by a form or JSON body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Trim both fields and require them to be non-empty
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(Self::new(name, email))
    }
}

/// Parse a `:id` path segment; ids are positive integers
pub fn parse_user_id(raw: &str) -> Result<i64, ValidationError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_fields() {
        let input = UserInput::new("  Alice ", " alice@x.com\n").validate().unwrap();
        assert_eq!(input, UserInput::new("Alice", "alice@x.com"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(
            UserInput::new("", "a@x.com").validate(),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            UserInput::new("A", "   ").validate(),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("12"), Ok(12));
        assert!(parse_user_id("0").is_err());
        assert!(parse_user_id("-3").is_err());
        assert!(parse_user_id("abc").is_err());
        assert!(parse_user_id("").is_err());
    }

    #[test]
    fn test_json_missing_fields_default_to_empty() {
        let input: UserInput = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert_eq!(input.validate(), Err(ValidationError::MissingFields));
    }
}
