//! JSON access-log record decoding.

use serde_json::{Map, Value};
use thiserror::Error;

/// One decoded access-log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub status: u16,
    /// `None` when the line carried no usable pool label.
    pub pool: Option<String>,
    pub raw: String,
}

impl LogRecord {
    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status)
    }
}

/// Why a line could not be turned into a [`LogRecord`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line is not a JSON object")]
    NotAnObject,

    #[error("missing '{0}' field")]
    MissingStatus(String),

    #[error("'{field}' is not a valid status code: {value}")]
    InvalidStatus { field: String, value: String },
}

/// Decodes access-log lines using a fixed set of field names.
#[derive(Debug, Clone)]
pub struct RecordParser {
    status_field: String,
    pool_fields: Vec<String>,
}

impl RecordParser {
    pub fn new(status_field: impl Into<String>, pool_fields: Vec<String>) -> Self {
        Self {
            status_field: status_field.into(),
            pool_fields,
        }
    }

    /// Parse one trimmed, non-empty line.
    pub fn parse(&self, line: &str) -> Result<LogRecord, ParseError> {
        let value: Value = serde_json::from_str(line)?;
        let object = value.as_object().ok_or(ParseError::NotAnObject)?;

        let status = self.status(object)?;
        let pool = self.pool(object);

        Ok(LogRecord {
            status,
            pool,
            raw: line.to_string(),
        })
    }

    fn status(&self, object: &Map<String, Value>) -> Result<u16, ParseError> {
        let value = object
            .get(&self.status_field)
            .ok_or_else(|| ParseError::MissingStatus(self.status_field.clone()))?;

        // nginx writes $status unquoted, but escape=json templates often quote it.
        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| ParseError::InvalidStatus {
            field: self.status_field.clone(),
            value: value.to_string(),
        })
    }

    fn pool(&self, object: &Map<String, Value>) -> Option<String> {
        self.pool_fields.iter().find_map(|field| {
            let label = object.get(field)?.as_str()?.trim();
            if label.is_empty() || label == "-" {
                None
            } else {
                Some(label.to_string())
            }
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new("status", vec!["pool".to_string(), "upstream_pool".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let parser = RecordParser::default();
        let line = r#"{"status":503,"pool":"green","request":"GET /"}"#;
        let record = parser.parse(line).unwrap();

        assert_eq!(record.status, 503);
        assert_eq!(record.pool.as_deref(), Some("green"));
        assert_eq!(record.raw, line);
        assert!(record.is_server_error());
    }

    #[test]
    fn test_status_as_string() {
        let record = RecordParser::default()
            .parse(r#"{"status":"200","pool":"blue"}"#)
            .unwrap();
        assert_eq!(record.status, 200);
        assert!(!record.is_server_error());
    }

    #[test]
    fn test_server_error_bounds() {
        let parser = RecordParser::default();
        let status_of = |s: u16| parser.parse(&format!(r#"{{"status":{s}}}"#)).unwrap();

        assert!(!status_of(499).is_server_error());
        assert!(status_of(500).is_server_error());
        assert!(status_of(599).is_server_error());
        assert!(!status_of(600).is_server_error());
    }

    #[test]
    fn test_empty_and_dash_pool_are_absent() {
        let parser = RecordParser::default();
        for pool in ["", "-", "   "] {
            let line = format!(r#"{{"status":200,"pool":"{pool}"}}"#);
            assert_eq!(parser.parse(&line).unwrap().pool, None, "pool {pool:?}");
        }
        assert_eq!(parser.parse(r#"{"status":200}"#).unwrap().pool, None);
    }

    #[test]
    fn test_alternate_pool_field() {
        let parser = RecordParser::default();
        let record = parser
            .parse(r#"{"status":200,"pool":"-","upstream_pool":"green"}"#)
            .unwrap();
        assert_eq!(record.pool.as_deref(), Some("green"));

        let record = parser
            .parse(r#"{"status":200,"pool":"blue","upstream_pool":"green"}"#)
            .unwrap();
        assert_eq!(record.pool.as_deref(), Some("blue"));
    }

    #[test]
    fn test_non_string_pool_ignored() {
        let record = RecordParser::default()
            .parse(r#"{"status":200,"pool":7}"#)
            .unwrap();
        assert_eq!(record.pool, None);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let parser = RecordParser::default();

        assert!(matches!(parser.parse("not json"), Err(ParseError::Json(_))));
        assert!(matches!(parser.parse(r#"{"status":2"#), Err(ParseError::Json(_))));
        assert!(matches!(parser.parse("[1,2]"), Err(ParseError::NotAnObject)));
        assert!(matches!(
            parser.parse(r#"{"pool":"blue"}"#),
            Err(ParseError::MissingStatus(_))
        ));
        assert!(matches!(
            parser.parse(r#"{"status":"abc"}"#),
            Err(ParseError::InvalidStatus { .. })
        ));
        assert!(matches!(
            parser.parse(r#"{"status":-1}"#),
            Err(ParseError::InvalidStatus { .. })
        ));
        assert!(matches!(
            parser.parse(r#"{"status":70000}"#),
            Err(ParseError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_custom_field_names() {
        let parser = RecordParser::new("code", vec!["x_app_pool".into()]);
        let record = parser.parse(r#"{"code":502,"x_app_pool":"green"}"#).unwrap();
        assert_eq!(record.status, 502);
        assert_eq!(record.pool.as_deref(), Some("green"));
    }
}
