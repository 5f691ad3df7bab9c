use chrono::{DateTime, Utc};

use udmi_coord::discovery::FamilyKey;
use udmi_coord::enumeration::DepthContext;
use udmi_coord::schema::{CapabilityResult, Depth, FeatureStage, Generation, SequenceResult};

pub struct ConfigureArgs {
    pub key: FamilyKey,
    pub config: String,
    pub schedule: bool,
}

pub struct TickArgs {
    pub key: FamilyKey,
    pub generation: Generation,
    pub elapsed_sec: u64,
}

pub struct RecordResultArgs {
    pub key: FamilyKey,
    pub generation: Generation,
    pub events: String,
}

pub struct ObserveArgs {
    pub key: FamilyKey,
    pub events: String,
    pub at: Option<DateTime<Utc>>,
}

pub struct WithdrawArgs {
    pub key: FamilyKey,
    pub addr: String,
}

pub struct PromoteArgs {
    pub key: FamilyKey,
    pub now: Option<DateTime<Utc>>,
}

pub struct ResultsArgs {
    pub key: FamilyKey,
    pub depth: Option<Depth>,
}

pub struct ResolveArgs {
    pub context: DepthContext,
    pub events: String,
    pub depth: Option<Depth>,
}

pub struct ExpectArgs {
    pub site_id: String,
    pub devices: Vec<String>,
}

pub struct RecordSequenceArgs {
    pub site_id: String,
    pub device_id: String,
    pub sequence: String,
    pub stage: FeatureStage,
    pub result: SequenceResult,
    pub message: Option<String>,
}

pub struct RecordCapabilityArgs {
    pub site_id: String,
    pub device_id: String,
    pub capability: String,
    pub stage: FeatureStage,
    pub result: CapabilityResult,
    pub score: u32,
    pub total: u32,
}

pub struct RecordPointsetArgs {
    pub site_id: String,
    pub device_id: String,
    pub summary: String,
}

pub struct DeviceArgs {
    pub site_id: String,
    pub device_id: String,
}

pub struct SummarizeArgs {
    pub site_id: String,
    pub min_stage: Option<FeatureStage>,
}
