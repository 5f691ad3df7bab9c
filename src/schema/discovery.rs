use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{Depth, Entry, FeatureStage, Generation};

wire_enum! {
    /// Lifecycle phase of one family's discovery scan.
    DiscoveryPhase, "phase" {
        Pending => "pending",
        Active => "active",
        Stopped => "stopped",
        Done => "done",
    }
}

impl DiscoveryPhase {
    /// `stopped` and `done` end a generation; only a new generation leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscoveryPhase::Stopped | DiscoveryPhase::Done)
    }
}

/// Scan configuration for one protocol family (`NetworkDiscoveryConfig`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FamilyDiscoveryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_duration_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumerate: Option<Depth>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FamilyDiscoveryState {
    pub generation: Generation,
    pub phase: DiscoveryPhase,
    #[serde(default)]
    pub record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

/// Discovery block of a device's state message.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DiscoveryState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
    #[serde(default)]
    pub families: BTreeMap<String, FamilyDiscoveryState>,
}

/// Address of a device within one protocol family.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct FamilyDiscovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RegistryDiscovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<BTreeMap<String, DeviceDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DeviceDiscovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub families: Option<BTreeMap<String, FamilyDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<BTreeMap<String, RefDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, FeatureDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
}

/// A point reference found on a device.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RefDiscovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancillary: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FeatureDiscovery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<FeatureStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Discovery / enumeration result tree.
///
/// Used both for the result of a family scan (one per discovered address) and
/// for a device enumerating itself. Substructure that is not reported is an
/// absent key, never an empty map.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DiscoveryEvents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgraded_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<Generation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_no: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub families: Option<BTreeMap<String, FamilyDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registries: Option<BTreeMap<String, RegistryDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<BTreeMap<String, DeviceDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<BTreeMap<String, RefDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, FeatureDiscovery>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<serde_json::Value>,
}

impl DiscoveryEvents {
    /// Copy of the envelope fields only, with every nested map absent.
    pub fn envelope(&self) -> DiscoveryEvents {
        DiscoveryEvents {
            timestamp: self.timestamp,
            version: self.version.clone(),
            upgraded_from: self.upgraded_from.clone(),
            generation: self.generation,
            scan_family: self.scan_family.clone(),
            scan_addr: self.scan_addr.clone(),
            event_no: self.event_no,
            status: self.status.clone(),
            ..DiscoveryEvents::default()
        }
    }
}
