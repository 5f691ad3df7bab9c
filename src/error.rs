use thiserror::Error;

use crate::schema::DiscoveryPhase;

/// Invalid scan or query parameters supplied by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid-duration: scan_duration_sec {duration} exceeds scan_interval_sec {interval}")]
    InvalidDuration { duration: u64, interval: u64 },
    #[error("invalid-passive: passive_sec {passive_sec} is out of range")]
    InvalidPassive { passive_sec: u64 },
    #[error("family '{family}' config carries no generation")]
    MissingGeneration { family: String },
    #[error("depth '{depth}' is not valid for {context} queries")]
    UnknownDepth { depth: String, context: &'static str },
}

/// A phase transition the state machine does not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid-transition: cannot {action} family '{family}' while {phase}")]
    InvalidTransition {
        family: String,
        action: &'static str,
        phase: DiscoveryPhase,
    },
    #[error("family '{family}' on device '{device_id}' has not been configured")]
    NotConfigured { device_id: String, family: String },
}

/// Malformed or unrecognised data on ingress.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("unknown {kind} value '{value}'")]
    UnknownValue { kind: &'static str, value: String },
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("score {score} exceeds total {total} for '{name}'")]
    ScoreExceedsTotal { name: String, score: u32, total: u32 },
    #[error("failed result for '{0}' must carry a status message")]
    FailWithoutMessage(String),
    #[error("could not parse JSON record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CoordError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type Result<T, E = CoordError> = std::result::Result<T, E>;
