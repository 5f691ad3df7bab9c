use crate::schema::FeatureStage;

pub const LOG_LEVEL: &str = "info";
pub const MIN_STAGE: FeatureStage = FeatureStage::Beta;

/// Schema version stamped on emitted reports.
pub const UDMI_VERSION: &str = "1.5.2";

pub const KVS_DB_PATH: &str = "kvs-db/udmi-coord.db";
