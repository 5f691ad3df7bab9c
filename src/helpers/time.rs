use chrono::{DateTime, Utc};

use crate::error::SchemaError;

/// Parse an RFC 3339 timestamp, or `now` for the current time.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, SchemaError> {
    if value == "now" {
        return Ok(Utc::now());
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| SchemaError::UnknownValue {
            kind: "timestamp",
            value: value.to_string(),
        })
}
