use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::discovery::family::{FamilyKey, FamilyScan, ScanSettings, Update};
use crate::discovery::generation::GenerationTracker;
use crate::error::{ConfigError, CoordError, StateError};
use crate::schema::{
    Depth, DiscoveryEvents, DiscoveryState, FamilyDiscoveryConfig, FamilyDiscoveryState,
    Generation,
};

/// Owns every family scan, keyed by (device, family).
///
/// Calls for the same key are serialized by the map's entry lock; calls for
/// different keys proceed in parallel. No lock is held across keys.
#[derive(Debug, Default)]
pub struct DiscoveryCoordinator {
    scans: DashMap<FamilyKey, FamilyScan>,
    generations: GenerationTracker,
}

impl DiscoveryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_scan<T, E>(
        &self,
        key: &FamilyKey,
        f: impl FnOnce(&mut FamilyScan) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StateError>,
    {
        let mut scan = self.scans.get_mut(key).ok_or_else(|| StateError::NotConfigured {
            device_id: key.device_id.clone(),
            family: key.family.clone(),
        })?;
        f(scan.value_mut())
    }

    /// Configure `key` under a freshly issued generation.
    pub fn schedule(
        &self,
        key: &FamilyKey,
        config: &FamilyDiscoveryConfig,
    ) -> Result<(Generation, Update), ConfigError> {
        self.schedule_at(key, config, Utc::now())
    }

    pub fn schedule_at(
        &self,
        key: &FamilyKey,
        config: &FamilyDiscoveryConfig,
        now: DateTime<Utc>,
    ) -> Result<(Generation, Update), ConfigError> {
        // Validate before issuing so a rejected config does not consume a generation
        let probe = FamilyDiscoveryConfig {
            generation: Some(Generation(now)),
            ..config.clone()
        };
        ScanSettings::from_config(&key.family, &probe)?;

        let generation = self.generations.new_generation_at(&key.to_string(), now);
        let config = FamilyDiscoveryConfig {
            generation: Some(generation),
            ..config.clone()
        };
        let update = self.configure(key, &config)?;
        Ok((generation, update))
    }

    pub fn configure(&self, key: &FamilyKey, config: &FamilyDiscoveryConfig) -> Result<Update, ConfigError> {
        let settings = ScanSettings::from_config(&key.family, config)?;
        let update = self
            .scans
            .entry(key.clone())
            .or_insert_with(|| FamilyScan::new(key.clone()))
            .configure(config)?;
        self.generations.observe(&key.to_string(), settings.generation);
        Ok(update)
    }

    pub fn start(&self, key: &FamilyKey) -> Result<Update, StateError> {
        self.with_scan(key, |scan| scan.start(Utc::now()))
    }

    pub fn tick(&self, key: &FamilyKey, generation: Generation, elapsed_sec: u64) -> Result<Update, StateError> {
        self.with_scan(key, |scan| scan.tick(generation, elapsed_sec, Utc::now()))
    }

    pub fn stop(&self, key: &FamilyKey) -> Result<Update, StateError> {
        self.with_scan(key, |scan| scan.stop(Utc::now()))
    }

    pub fn record_result(
        &self,
        key: &FamilyKey,
        generation: Generation,
        events: DiscoveryEvents,
    ) -> Result<Update, CoordError> {
        self.with_scan(key, |scan| scan.record_result(generation, events))
    }

    pub fn observe_passive(
        &self,
        key: &FamilyKey,
        events: DiscoveryEvents,
        at: DateTime<Utc>,
    ) -> Result<(), CoordError> {
        self.with_scan(key, |scan| scan.observe_passive(events, at))
    }

    pub fn withdraw_passive(&self, key: &FamilyKey, addr: &str) -> Result<bool, StateError> {
        self.with_scan(key, |scan| Ok(scan.withdraw_passive(addr)))
    }

    pub fn promote_passive(&self, key: &FamilyKey, now: DateTime<Utc>) -> Result<usize, StateError> {
        self.with_scan(key, |scan| scan.promote_passive(now))
    }

    pub fn family_state(&self, key: &FamilyKey) -> Option<FamilyDiscoveryState> {
        self.scans.get(key).and_then(|scan| scan.state().cloned())
    }

    /// Discovery block for one device's state message, built from a point-in-time copy.
    pub fn discovery_state(&self, device_id: &str) -> DiscoveryState {
        let families: BTreeMap<String, FamilyDiscoveryState> = self
            .scans
            .iter()
            .filter(|entry| entry.key().device_id == device_id)
            .filter_map(|entry| {
                entry
                    .value()
                    .state()
                    .cloned()
                    .map(|state| (entry.key().family.clone(), state))
            })
            .collect();
        DiscoveryState {
            generation: families.values().map(|state| state.generation).max(),
            families,
        }
    }

    pub fn scan_results(
        &self,
        key: &FamilyKey,
        depth: Option<Depth>,
    ) -> Result<BTreeMap<String, DiscoveryEvents>, CoordError> {
        let scan = self.scans.get(key).ok_or_else(|| StateError::NotConfigured {
            device_id: key.device_id.clone(),
            family: key.family.clone(),
        })?;
        scan.results(depth).map_err(Into::into)
    }

    pub fn snapshot(&self, key: &FamilyKey) -> Option<FamilyScan> {
        self.scans.get(key).map(|scan| scan.clone())
    }

    /// Reinstate a persisted scan, replacing any in-memory one for the same key.
    pub fn restore(&self, scan: FamilyScan) {
        if let Some(generation) = scan.generation() {
            self.generations.observe(&scan.key().to_string(), generation);
        }
        self.scans.insert(scan.key().clone(), scan);
    }

    pub fn keys(&self) -> Vec<FamilyKey> {
        let mut keys: Vec<FamilyKey> = self.scans.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}
