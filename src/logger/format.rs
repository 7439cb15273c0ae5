//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` placeholders

use chrono::{DateTime, Local};
use serde::Serialize;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Access log layout, parsed once from `logging.access_log_format`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessLogFormat {
    Combined,
    Common,
    Json,
    Custom(String),
}

impl AccessLogFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

/// One served request
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub time: DateTime<Local>,
    pub method: String,
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Handler time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry stamped with the current time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn render(&self, format: &AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.common_line(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            AccessLogFormat::Common => self.common_line(),
            AccessLogFormat::Json => {
                serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
            }
            AccessLogFormat::Custom(pattern) => self.render_pattern(pattern),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn common_line(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.method,
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Value of a `$variable`, `None` for unknown names
    fn variable(&self, name: &str) -> Option<String> {
        let value = match name {
            "remote_addr" => self.remote_addr.clone(),
            "time_local" => self.time.format(CLF_TIME).to_string(),
            "time_iso8601" => self.time.to_rfc3339(),
            "request" => format!(
                "{} {} HTTP/{}",
                self.method,
                self.request_uri(),
                self.http_version
            ),
            "request_method" => self.method.clone(),
            "request_uri" => self.request_uri(),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let secs = self.request_time_us as f64 / 1_000_000.0;
                format!("{secs:.3}")
            }
            "status" => self.status.to_string(),
            "body_bytes_sent" => self.body_bytes.to_string(),
            "http_referer" => self.referer.clone().unwrap_or_else(|| "-".to_string()),
            "http_user_agent" => self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            _ => return None,
        };
        Some(value)
    }

    /// Substitute `$name` tokens; a token ends at the first character that is
    /// not alphanumeric or `_`. Unknown tokens are left as written.
    fn render_pattern(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 32);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..len];

            match self.variable(name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }

        out.push_str(rest);
        out
    }
}

fn serialize_rfc3339<S: serde::Serializer>(
    time: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "192.168.1.1".to_string(),
            "POST".to_string(),
            "/edit/3".to_string(),
        );
        entry.query = Some("from=list".to_string());
        entry.status = 303;
        entry.body_bytes = 12;
        entry.referer = Some("http://localhost:8080/edit/3".to_string());
        entry.user_agent = Some("Mozilla/5.0".to_string());
        entry.request_time_us = 1500;
        entry
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(AccessLogFormat::parse("combined"), AccessLogFormat::Combined);
        assert_eq!(AccessLogFormat::parse(""), AccessLogFormat::Combined);
        assert_eq!(AccessLogFormat::parse("common"), AccessLogFormat::Common);
        assert_eq!(AccessLogFormat::parse("json"), AccessLogFormat::Json);
        assert_eq!(
            AccessLogFormat::parse("$status"),
            AccessLogFormat::Custom("$status".to_string())
        );
    }

    #[test]
    fn test_format_combined() {
        let log = create_test_entry().render(&AccessLogFormat::Combined);
        assert!(log.starts_with("192.168.1.1 - - ["));
        assert!(log.contains("\"POST /edit/3?from=list HTTP/1.1\" 303 12"));
        assert!(log.ends_with("\"http://localhost:8080/edit/3\" \"Mozilla/5.0\""));
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().render(&AccessLogFormat::Common);
        assert!(log.contains("\"POST /edit/3?from=list HTTP/1.1\" 303 12"));
        assert!(!log.contains("Mozilla"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().render(&AccessLogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "192.168.1.1");
        assert_eq!(value["method"], "POST");
        assert_eq!(value["status"], 303);
        assert_eq!(value["body_bytes"], 12);
        assert!(value["time"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_format_custom() {
        let entry = create_test_entry();
        let log = entry.render(&AccessLogFormat::parse(
            "$remote_addr|$request|$status|$request_time|$nope",
        ));
        assert_eq!(
            log,
            "192.168.1.1|POST /edit/3?from=list HTTP/1.1|303|0.002|$nope"
        );
    }
}
