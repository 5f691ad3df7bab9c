pub const DATA_DIR: &str = "UDMI_DATA_DIR";
pub const SNAP_COMMON: &str = "SNAP_COMMON";

pub const LOG_LEVEL: &str = "LOG_LEVEL";

// Minimum feature stage that counts towards validation scores
pub const MIN_STAGE: &str = "UDMI_MIN_STAGE";
