use std::path::Path;

use anyhow::Result;
use kvstore::KVDb;

use crate::constants::keys;
use crate::discovery::{FamilyKey, FamilyScan};
use crate::interfaces::kvpath;
use crate::validation::{AggregatorSnapshot, ValidationAggregator};

/// Scans and site aggregators persisted between invocations.
pub struct Store(KVDb);

impl Store {
    /// Open the store at the configured data directory.
    pub fn open() -> Result<Self> {
        Self::open_at(kvpath::SQLITE_STORE.as_path())
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Store(KVDb::new(path)?))
    }

    pub fn load_scan(&self, key: &FamilyKey) -> Result<Option<FamilyScan>> {
        Ok(self.0.get(keys::scan(key))?)
    }

    pub fn save_scan(&self, scan: &FamilyScan) -> Result<()> {
        log::debug!("Saving scan {}", scan.key());
        Ok(self.0.set(keys::scan(scan.key()), scan)?)
    }

    /// Every stored scan of one device.
    pub fn load_device_scans(&self, device_id: &str) -> Result<Vec<FamilyScan>> {
        let mut scans = Vec::new();
        for key in self.0.keys_with_prefix(&keys::device_scans(device_id))? {
            if let Some(scan) = self.0.get::<FamilyScan>(&key)? {
                scans.push(scan);
            }
        }
        Ok(scans)
    }

    pub fn load_site(&self, site_id: &str) -> Result<Option<ValidationAggregator>> {
        let snapshot: Option<AggregatorSnapshot> = self.0.get(keys::site(site_id))?;
        Ok(snapshot.map(ValidationAggregator::from_snapshot))
    }

    pub fn save_site(&self, aggregator: &ValidationAggregator) -> Result<()> {
        log::debug!("Saving site {}", aggregator.site_id());
        Ok(self.0.set(keys::site(aggregator.site_id()), aggregator.snapshot())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CapabilityResult, FamilyDiscoveryConfig, FeatureStage};

    #[test]
    fn scans_are_listed_per_device() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = Store::open_at(tempdir.path().join("store.db")).unwrap();
        let config = FamilyDiscoveryConfig {
            generation: Some("2024-03-01T12:00:00Z".parse().unwrap()),
            scan_interval_sec: Some(600),
            scan_duration_sec: Some(60),
            ..FamilyDiscoveryConfig::default()
        };
        for (device, family) in [("GAT-1", "bacnet"), ("GAT-1", "ipv4"), ("GAT-10", "bacnet")] {
            let mut scan = FamilyScan::new(FamilyKey::new(device, family));
            scan.configure(&config).unwrap();
            store.save_scan(&scan).unwrap();
        }

        let scans = store.load_device_scans("GAT-1").unwrap();
        let families: Vec<&str> = scans.iter().map(|scan| scan.key().family.as_str()).collect();
        assert_eq!(families, vec!["bacnet", "ipv4"]);

        let key = FamilyKey::new("GAT-10", "bacnet");
        assert_eq!(store.load_scan(&key).unwrap().unwrap().key(), &key);
    }

    #[test]
    fn slashes_in_ids_do_not_collide() {
        let tempdir = tempfile::tempdir().unwrap();
        let store = Store::open_at(tempdir.path().join("store.db")).unwrap();
        let config = FamilyDiscoveryConfig {
            generation: Some("2024-03-01T12:00:00Z".parse().unwrap()),
            ..FamilyDiscoveryConfig::default()
        };
        for (device, family) in [("A/B", "c"), ("A", "B/c")] {
            let mut scan = FamilyScan::new(FamilyKey::new(device, family));
            scan.configure(&config).unwrap();
            store.save_scan(&scan).unwrap();
        }

        let nested = store.load_device_scans("A").unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].key(), &FamilyKey::new("A", "B/c"));

        let slashed = store.load_device_scans("A/B").unwrap();
        assert_eq!(slashed.len(), 1);
        assert_eq!(slashed[0].key(), &FamilyKey::new("A/B", "c"));
    }

    #[test]
    fn site_survives_reopen() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("store.db");
        {
            let store = Store::open_at(&path).unwrap();
            let aggregator = ValidationAggregator::new("ZZ-TRI-FECTA", FeatureStage::Beta);
            aggregator
                .record_capability_result("AHU-1", "pointset", FeatureStage::Beta, CapabilityResult::Pass, 8, 10)
                .unwrap();
            store.save_site(&aggregator).unwrap();
        }
        let store = Store::open_at(&path).unwrap();
        let aggregator = store.load_site("ZZ-TRI-FECTA").unwrap().unwrap();
        assert_eq!(aggregator.summarize().score.value, 8);
        assert!(store.load_site("ZZ-OTHER").unwrap().is_none());
    }
}
