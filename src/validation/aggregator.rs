use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};

use crate::constants::categories;
use crate::error::SchemaError;
use crate::schema::{
    levels, CapabilityResult, CapabilityValidationState, Entry, FeatureStage, PointsetSummary,
    SequenceResult, SequenceValidationState, ValidationState,
};
use crate::validation::summary::summarize_snapshot;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct ResultKey {
    device_id: String,
    name: String,
}

impl ResultKey {
    fn new(device_id: &str, name: &str) -> Self {
        ResultKey {
            device_id: device_id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Point-in-time copy of one site's validation results.
///
/// This is also the persisted form of a [`ValidationAggregator`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AggregatorSnapshot {
    pub site_id: String,
    pub min_stage: FeatureStage,
    #[serde(default)]
    pub expected: BTreeSet<String>,
    #[serde(default)]
    pub seen: BTreeSet<String>,
    #[serde(default)]
    pub base64: BTreeSet<String>,
    #[serde(default)]
    pub sequences: BTreeMap<String, BTreeMap<String, SequenceValidationState>>,
    #[serde(default)]
    pub capabilities: BTreeMap<String, BTreeMap<String, CapabilityValidationState>>,
    #[serde(default)]
    pub pointsets: BTreeMap<String, PointsetSummary>,
}

impl AggregatorSnapshot {
    pub fn summarize(&self, min_stage: FeatureStage, now: DateTime<Utc>) -> ValidationState {
        summarize_snapshot(self, min_stage, now)
    }
}

/// Last-write-wins store of validation results for one site.
///
/// Writers for different (device, name) keys do not contend; summaries work
/// from a copied snapshot and never block writers for long.
#[derive(Debug)]
pub struct ValidationAggregator {
    site_id: String,
    min_stage: RwLock<FeatureStage>,
    expected: RwLock<BTreeSet<String>>,
    seen: DashSet<String>,
    base64: DashSet<String>,
    sequences: DashMap<ResultKey, SequenceValidationState>,
    capabilities: DashMap<ResultKey, CapabilityValidationState>,
    pointsets: DashMap<String, PointsetSummary>,
}

fn check_fail_message(name: &str, failed: bool, status: Option<&Entry>) -> Result<(), SchemaError> {
    let has_message = status.is_some_and(|entry| !entry.message.trim().is_empty());
    if failed && !has_message {
        return Err(SchemaError::FailWithoutMessage(name.to_string()));
    }
    Ok(())
}

impl ValidationAggregator {
    pub fn new(site_id: impl Into<String>, min_stage: FeatureStage) -> Self {
        ValidationAggregator {
            site_id: site_id.into(),
            min_stage: RwLock::new(min_stage),
            expected: RwLock::new(BTreeSet::new()),
            seen: DashSet::new(),
            base64: DashSet::new(),
            sequences: DashMap::new(),
            capabilities: DashMap::new(),
            pointsets: DashMap::new(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn min_stage(&self) -> FeatureStage {
        *self.min_stage.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_min_stage(&self, stage: FeatureStage) {
        *self.min_stage.write().unwrap_or_else(PoisonError::into_inner) = stage;
    }

    /// Replace the configured device set supplied by the site model.
    pub fn set_expected_devices<I, S>(&self, devices: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let devices: BTreeSet<String> = devices.into_iter().map(Into::into).collect();
        log::debug!("{}: expecting {} device(s)", self.site_id, devices.len());
        *self.expected.write().unwrap_or_else(PoisonError::into_inner) = devices;
    }

    /// Mark a device as seen without recording any result for it.
    pub fn record_seen(&self, device_id: &str) {
        self.seen.insert(device_id.to_string());
    }

    pub fn record_sequence_result(
        &self,
        device_id: &str,
        sequence: &str,
        stage: FeatureStage,
        result: SequenceResult,
        status: Option<Entry>,
    ) -> Result<(), SchemaError> {
        self.record_sequence_state(
            device_id,
            sequence,
            SequenceValidationState {
                summary: None,
                stage,
                result,
                status,
            },
        )
    }

    pub fn record_sequence_state(
        &self,
        device_id: &str,
        sequence: &str,
        state: SequenceValidationState,
    ) -> Result<(), SchemaError> {
        check_fail_message(sequence, state.result == SequenceResult::Fail, state.status.as_ref())?;
        log::debug!("{}: {device_id}/{sequence} -> {}", self.site_id, state.result);
        self.seen.insert(device_id.to_string());
        self.sequences.insert(ResultKey::new(device_id, sequence), state);
        Ok(())
    }

    /// Record a capability result. A failure gets a generated status entry.
    pub fn record_capability_result(
        &self,
        device_id: &str,
        capability: &str,
        stage: FeatureStage,
        result: CapabilityResult,
        score: u32,
        total: u32,
    ) -> Result<(), SchemaError> {
        let status = (result == CapabilityResult::Fail).then(|| {
            Entry::new(
                categories::CAPABILITY,
                format!("Capability {capability} failed with score {score}/{total}"),
                levels::ERROR,
                Utc::now(),
            )
        });
        self.record_capability_state(
            device_id,
            capability,
            CapabilityValidationState {
                summary: None,
                stage,
                result,
                score,
                total,
                status,
            },
        )
    }

    pub fn record_capability_state(
        &self,
        device_id: &str,
        capability: &str,
        state: CapabilityValidationState,
    ) -> Result<(), SchemaError> {
        if state.score > state.total {
            return Err(SchemaError::ScoreExceedsTotal {
                name: capability.to_string(),
                score: state.score,
                total: state.total,
            });
        }
        check_fail_message(capability, state.result == CapabilityResult::Fail, state.status.as_ref())?;
        log::debug!(
            "{}: {device_id}/{capability} -> {} ({}/{})",
            self.site_id,
            state.result,
            state.score,
            state.total
        );
        self.seen.insert(device_id.to_string());
        self.capabilities.insert(ResultKey::new(device_id, capability), state);
        Ok(())
    }

    pub fn record_pointset(&self, device_id: &str, summary: PointsetSummary) {
        self.seen.insert(device_id.to_string());
        self.pointsets.insert(device_id.to_string(), summary);
    }

    /// Note that a device sent base64-encoded payloads.
    pub fn record_base64(&self, device_id: &str) {
        self.seen.insert(device_id.to_string());
        self.base64.insert(device_id.to_string());
    }

    pub fn snapshot(&self) -> AggregatorSnapshot {
        let mut sequences: BTreeMap<String, BTreeMap<String, SequenceValidationState>> = BTreeMap::new();
        for entry in self.sequences.iter() {
            sequences
                .entry(entry.key().device_id.clone())
                .or_default()
                .insert(entry.key().name.clone(), entry.value().clone());
        }
        let mut capabilities: BTreeMap<String, BTreeMap<String, CapabilityValidationState>> =
            BTreeMap::new();
        for entry in self.capabilities.iter() {
            capabilities
                .entry(entry.key().device_id.clone())
                .or_default()
                .insert(entry.key().name.clone(), entry.value().clone());
        }

        AggregatorSnapshot {
            site_id: self.site_id.clone(),
            min_stage: self.min_stage(),
            expected: self.expected.read().unwrap_or_else(PoisonError::into_inner).clone(),
            seen: self.seen.iter().map(|d| d.key().clone()).collect(),
            base64: self.base64.iter().map(|d| d.key().clone()).collect(),
            sequences,
            capabilities,
            pointsets: self
                .pointsets
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: AggregatorSnapshot) -> Self {
        let aggregator = ValidationAggregator::new(snapshot.site_id, snapshot.min_stage);
        aggregator.set_expected_devices(snapshot.expected);
        for device_id in snapshot.seen {
            aggregator.seen.insert(device_id);
        }
        for device_id in snapshot.base64 {
            aggregator.base64.insert(device_id);
        }
        for (device_id, sequences) in snapshot.sequences {
            for (name, state) in sequences {
                aggregator.sequences.insert(ResultKey::new(&device_id, &name), state);
            }
        }
        for (device_id, capabilities) in snapshot.capabilities {
            for (name, state) in capabilities {
                aggregator.capabilities.insert(ResultKey::new(&device_id, &name), state);
            }
        }
        for (device_id, summary) in snapshot.pointsets {
            aggregator.pointsets.insert(device_id, summary);
        }
        aggregator
    }

    /// Site report at the configured minimum stage.
    pub fn summarize(&self) -> ValidationState {
        self.summarize_at(self.min_stage(), Utc::now())
    }

    pub fn summarize_at(&self, min_stage: FeatureStage, now: DateTime<Utc>) -> ValidationState {
        self.snapshot().summarize(min_stage, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(message: &str) -> Option<Entry> {
        Some(Entry::new("validation.feature.sequence", message, levels::ERROR, Utc::now()))
    }

    #[test]
    fn later_result_replaces_earlier() {
        let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Alpha);
        aggregator
            .record_sequence_result("AHU-1", "writeback_success", FeatureStage::Beta, SequenceResult::Start, None)
            .unwrap();
        aggregator
            .record_sequence_result(
                "AHU-1",
                "writeback_success",
                FeatureStage::Beta,
                SequenceResult::Fail,
                failure("Timeout waiting for writeback"),
            )
            .unwrap();

        let snapshot = aggregator.snapshot();
        let sequences = &snapshot.sequences["AHU-1"];
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences["writeback_success"].result, SequenceResult::Fail);
    }

    #[test]
    fn fail_requires_message() {
        let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Alpha);
        let err = aggregator
            .record_sequence_result("AHU-1", "broken_config", FeatureStage::Stable, SequenceResult::Fail, failure("  "))
            .unwrap_err();
        assert!(matches!(err, SchemaError::FailWithoutMessage(name) if name == "broken_config"));
        assert!(aggregator.snapshot().seen.is_empty());
    }

    #[test]
    fn score_cannot_exceed_total() {
        let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Alpha);
        let err = aggregator
            .record_capability_result("AHU-1", "pointset", FeatureStage::Beta, CapabilityResult::Pass, 11, 10)
            .unwrap_err();
        assert!(matches!(err, SchemaError::ScoreExceedsTotal { score: 11, total: 10, .. }));
        assert!(aggregator.snapshot().capabilities.is_empty());
    }

    #[test]
    fn failed_capability_gets_status() {
        let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Alpha);
        aggregator
            .record_capability_result("AHU-1", "pointset", FeatureStage::Beta, CapabilityResult::Fail, 2, 10)
            .unwrap();
        let snapshot = aggregator.snapshot();
        let status = snapshot.capabilities["AHU-1"]["pointset"].status.clone().unwrap();
        assert_eq!(status.level, levels::ERROR);
        assert!(status.message.contains("2/10"));
    }

    #[test]
    fn snapshot_round_trip() {
        let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Beta);
        aggregator.set_expected_devices(["AHU-1", "AHU-2"]);
        aggregator
            .record_capability_result("AHU-1", "pointset", FeatureStage::Beta, CapabilityResult::Pass, 8, 10)
            .unwrap();
        aggregator.record_base64("AHU-2");
        aggregator.record_pointset(
            "SNS-4",
            PointsetSummary {
                missing: vec!["zone_temp".to_string()],
                extra: vec![],
            },
        );

        let json = serde_json::to_string(&aggregator.snapshot()).unwrap();
        let restored = ValidationAggregator::from_snapshot(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.snapshot(), aggregator.snapshot());
        assert_eq!(restored.min_stage(), FeatureStage::Beta);
    }
}
