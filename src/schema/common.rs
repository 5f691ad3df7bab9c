use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Numeric severity levels used by [`Entry::level`].
pub mod levels {
    pub const DEBUG: u16 = 100;
    pub const INFO: u16 = 200;
    pub const NOTICE: u16 = 300;
    pub const WARNING: u16 = 400;
    pub const ERROR: u16 = 500;
    pub const CRITICAL: u16 = 600;
    pub const ALERT: u16 = 700;
    pub const EMERGENCY: u16 = 800;
}

/// Severity-leveled status log entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Entry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub level: u16,
}

impl Entry {
    pub fn new(category: &str, message: impl Into<String>, level: u16, timestamp: DateTime<Utc>) -> Self {
        Entry {
            message: message.into(),
            detail: None,
            category: category.to_string(),
            timestamp,
            level,
        }
    }
}

/// Timestamp-valued identifier of one discovery round.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Generation(pub DateTime<Utc>);

impl Generation {
    /// Smallest step between two issued generations of the same subject.
    pub fn epsilon() -> Duration {
        Duration::milliseconds(1)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn next_after(&self) -> Generation {
        Generation(self.0 + Self::epsilon())
    }
}

impl From<DateTime<Utc>> for Generation {
    fn from(value: DateTime<Utc>) -> Self {
        Generation(value)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl FromStr for Generation {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(value)
            .map(|ts| Generation(ts.with_timezone(&Utc)))
            .map_err(|_| SchemaError::UnknownValue {
                kind: "generation",
                value: value.to_string(),
            })
    }
}

wire_enum! {
    /// Maturity classifier attached to features, capabilities and sequences.
    FeatureStage, "stage" {
        Disabled => "disabled",
        Alpha => "alpha",
        Preview => "preview",
        Beta => "beta",
        Stable => "stable",
    }
}

wire_enum! {
    /// Requested nesting level for hierarchical results.
    ///
    /// Which tokens are meaningful, and their order, depends on the query
    /// context; see [`crate::enumeration::DepthContext`].
    Depth, "depth" {
        Buckets => "buckets",
        Registries => "registries",
        Devices => "devices",
        Entries => "entries",
        Details => "details",
        Parts => "parts",
    }
}

/// Summed score. Wider than a single capability score so roll-ups cannot overflow.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Scoring {
    pub value: u64,
    pub total: u64,
}

impl Scoring {
    pub fn add(&mut self, value: u64, total: u64) {
        self.value = self.value.saturating_add(value);
        self.total = self.total.saturating_add(total);
    }
}

impl std::ops::AddAssign for Scoring {
    fn add_assign(&mut self, other: Scoring) {
        self.add(other.value, other.total);
    }
}
