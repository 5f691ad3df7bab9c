use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Entry, FeatureStage, Scoring};

wire_enum! {
    SequenceResult, "sequence result" {
        Start => "start",
        Skip => "skip",
        Pass => "pass",
        Fail => "fail",
    }
}

wire_enum! {
    CapabilityResult, "capability result" {
        Pass => "pass",
        Fail => "fail",
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SequenceValidationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub stage: FeatureStage,
    pub result: SequenceResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapabilityValidationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub stage: FeatureStage,
    pub result: CapabilityResult,
    pub score: u32,
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

/// Point-set errors for one device.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PointsetSummary {
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub extra: Vec<String>,
}

impl PointsetSummary {
    pub fn has_errors(&self) -> bool {
        !self.missing.is_empty() || !self.extra.is_empty()
    }
}

/// Site-wide device classification. Every list is sorted.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationSummary {
    #[serde(default)]
    pub extra_devices: Vec<String>,
    #[serde(default)]
    pub missing_devices: Vec<String>,
    #[serde(default)]
    pub pointset_devices: Vec<String>,
    #[serde(default)]
    pub base64_devices: Vec<String>,
    #[serde(default)]
    pub error_devices: Vec<String>,
    #[serde(default)]
    pub expected_devices: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeviceValidationState {
    pub score: Scoring,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sequences: BTreeMap<String, SequenceValidationState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub capabilities: BTreeMap<String, CapabilityValidationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointset: Option<PointsetSummary>,
}

/// Site validation report.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValidationState {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub site_id: String,
    pub min_stage: FeatureStage,
    pub summary: ValidationSummary,
    pub score: Scoring,
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceValidationState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_sequence_state() {
        let state: SequenceValidationState = serde_json::from_value(json!({
            "summary": "Check that the device writes a pointset",
            "stage": "beta",
            "result": "fail",
            "status": {
                "message": "Missing point zone_temp",
                "category": "validation.feature.sequence",
                "timestamp": "2024-03-01T12:00:00Z",
                "level": 500
            }
        }))
        .unwrap();
        assert_eq!(state.result, SequenceResult::Fail);
        assert_eq!(state.status.unwrap().level, 500);
    }

    #[test]
    fn capability_result_has_no_start() {
        assert!(serde_json::from_value::<CapabilityResult>(json!("start")).is_err());
        assert!("skip".parse::<CapabilityResult>().is_err());
        assert_eq!("fail".parse::<SequenceResult>().unwrap(), SequenceResult::Fail);
    }

    #[test]
    fn summary_serializes_every_list() {
        let value = serde_json::to_value(ValidationSummary::default()).unwrap();
        for field in [
            "extra_devices",
            "missing_devices",
            "pointset_devices",
            "base64_devices",
            "error_devices",
            "expected_devices",
        ] {
            assert_eq!(value[field], json!([]), "{field}");
        }
    }
}
