// Status entry categories written by the scan state machine
pub const SCAN_START: &str = "discovery.scan.start";
pub const SCAN_DONE: &str = "discovery.scan.done";
pub const SCAN_STOP: &str = "discovery.scan.stop";

pub const CAPABILITY: &str = "validation.feature.capability";
pub const SEQUENCE: &str = "validation.feature.sequence";
