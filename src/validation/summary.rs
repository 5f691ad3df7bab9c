use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::constants::defaults;
use crate::schema::{
    CapabilityResult, DeviceValidationState, FeatureStage, Scoring, SequenceResult,
    ValidationState, ValidationSummary,
};
use crate::validation::aggregator::AggregatorSnapshot;

fn sorted<'a>(devices: impl Iterator<Item = &'a String>) -> Vec<String> {
    devices.cloned().collect()
}

/// Every device with at least one recorded result or observation.
fn seen_devices(snapshot: &AggregatorSnapshot) -> BTreeSet<String> {
    snapshot
        .seen
        .iter()
        .chain(snapshot.base64.iter())
        .chain(snapshot.sequences.keys())
        .chain(snapshot.capabilities.keys())
        .chain(snapshot.pointsets.keys())
        .cloned()
        .collect()
}

fn has_failure(snapshot: &AggregatorSnapshot, device_id: &str) -> bool {
    let sequence_failed = snapshot.sequences.get(device_id).is_some_and(|sequences| {
        sequences.values().any(|s| s.result == SequenceResult::Fail)
    });
    let capability_failed = snapshot.capabilities.get(device_id).is_some_and(|capabilities| {
        capabilities.values().any(|c| c.result == CapabilityResult::Fail)
    });
    sequence_failed || capability_failed
}

fn device_state(snapshot: &AggregatorSnapshot, device_id: &str, min_stage: FeatureStage) -> DeviceValidationState {
    let capabilities = snapshot.capabilities.get(device_id).cloned().unwrap_or_default();
    let mut score = Scoring::default();
    for capability in capabilities.values().filter(|c| c.stage >= min_stage) {
        score.add(capability.score.into(), capability.total.into());
    }
    DeviceValidationState {
        score,
        sequences: snapshot.sequences.get(device_id).cloned().unwrap_or_default(),
        capabilities,
        pointset: snapshot.pointsets.get(device_id).cloned(),
    }
}

pub(crate) fn summarize_snapshot(
    snapshot: &AggregatorSnapshot,
    min_stage: FeatureStage,
    now: DateTime<Utc>,
) -> ValidationState {
    let seen = seen_devices(snapshot);
    let expected = &snapshot.expected;

    let devices: BTreeMap<String, DeviceValidationState> = seen
        .iter()
        .map(|device_id| (device_id.clone(), device_state(snapshot, device_id, min_stage)))
        .collect();

    let mut score = Scoring::default();
    for device in devices.values() {
        score += device.score;
    }

    let summary = ValidationSummary {
        extra_devices: sorted(seen.difference(expected)),
        missing_devices: sorted(expected.difference(&seen)),
        pointset_devices: sorted(
            snapshot
                .pointsets
                .iter()
                .filter(|(_, pointset)| pointset.has_errors())
                .map(|(device_id, _)| device_id),
        ),
        base64_devices: sorted(snapshot.base64.iter()),
        error_devices: sorted(seen.iter().filter(|device_id| has_failure(snapshot, device_id))),
        expected_devices: sorted(expected.iter()),
    };

    log::debug!(
        "{}: {} seen, {} missing, {} extra, score {}/{}",
        snapshot.site_id,
        seen.len(),
        summary.missing_devices.len(),
        summary.extra_devices.len(),
        score.value,
        score.total
    );

    ValidationState {
        version: defaults::UDMI_VERSION.to_string(),
        timestamp: now,
        site_id: snapshot.site_id.clone(),
        min_stage,
        summary,
        score,
        devices,
    }
}
