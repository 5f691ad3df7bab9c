//! Per-family scan state machine
//!
//! ```text
//!   pending ──start──▶ active ──tick(elapsed ≥ duration)──▶ done
//!      │                  │
//!      └──────stop────────┴──────────────────────────────▶ stopped
//! ```
//!
//! `stopped` and `done` are terminal for a generation. A configuration with a
//! newer generation resets the scan to `pending` from any phase.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::categories;
use crate::discovery::generation::is_stale;
use crate::discovery::passive::PassiveGate;
use crate::enumeration::{resolve, DepthContext};
use crate::error::{ConfigError, CoordError, SchemaError, StateError};
use crate::schema::{
    levels, Depth, DiscoveryEvents, DiscoveryPhase, Entry, FamilyDiscoveryConfig,
    FamilyDiscoveryState, Generation,
};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyKey {
    pub device_id: String,
    pub family: String,
}

impl FamilyKey {
    pub fn new(device_id: impl Into<String>, family: impl Into<String>) -> Self {
        FamilyKey {
            device_id: device_id.into(),
            family: family.into(),
        }
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.family)
    }
}

/// Outcome of a mutating call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    /// The call changed state; carries the resulting phase.
    Applied(DiscoveryPhase),
    /// Accepted, but nothing changed.
    Unchanged(DiscoveryPhase),
    /// Dropped because a newer generation is installed.
    Stale {
        received: Generation,
        current: Generation,
    },
}

/// Validated scan parameters for one generation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScanSettings {
    pub generation: Generation,
    pub scan_interval_sec: Option<u64>,
    pub scan_duration_sec: Option<u64>,
    pub passive_sec: Option<u64>,
    pub enumerate: Option<Depth>,
}

impl ScanSettings {
    pub fn from_config(family: &str, config: &FamilyDiscoveryConfig) -> Result<Self, ConfigError> {
        if let (Some(duration), Some(interval)) = (config.scan_duration_sec, config.scan_interval_sec) {
            if duration > interval {
                return Err(ConfigError::InvalidDuration { duration, interval });
            }
        }
        if let Some(passive_sec) = config.passive_sec {
            holdoff_from_secs(passive_sec).ok_or(ConfigError::InvalidPassive { passive_sec })?;
        }
        let generation = config.generation.ok_or_else(|| ConfigError::MissingGeneration {
            family: family.to_string(),
        })?;
        Ok(ScanSettings {
            generation,
            scan_interval_sec: config.scan_interval_sec,
            scan_duration_sec: config.scan_duration_sec,
            passive_sec: config.passive_sec,
            enumerate: config.enumerate,
        })
    }

    fn passive_holdoff(&self) -> Duration {
        match self.passive_sec {
            None => Duration::zero(),
            // Settings restored from storage skip validation; never release early
            Some(secs) => holdoff_from_secs(secs).unwrap_or(Duration::MAX),
        }
    }
}

fn holdoff_from_secs(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

/// Discovery state, results and held passive sightings for one (device, family).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FamilyScan {
    key: FamilyKey,
    settings: Option<ScanSettings>,
    state: Option<FamilyDiscoveryState>,
    #[serde(default)]
    last_event_no: u64,
    #[serde(default)]
    results: BTreeMap<String, DiscoveryEvents>,
    #[serde(default)]
    passive: PassiveGate,
}

impl FamilyScan {
    pub fn new(key: FamilyKey) -> Self {
        FamilyScan {
            key,
            settings: None,
            state: None,
            last_event_no: 0,
            results: BTreeMap::new(),
            passive: PassiveGate::default(),
        }
    }

    pub fn key(&self) -> &FamilyKey {
        &self.key
    }

    pub fn settings(&self) -> Option<&ScanSettings> {
        self.settings.as_ref()
    }

    pub fn state(&self) -> Option<&FamilyDiscoveryState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Option<DiscoveryPhase> {
        self.state.as_ref().map(|s| s.phase)
    }

    pub fn generation(&self) -> Option<Generation> {
        self.state.as_ref().map(|s| s.generation)
    }

    pub fn held_sightings(&self) -> usize {
        self.passive.len()
    }

    fn current(&self) -> Result<&FamilyDiscoveryState, StateError> {
        self.state.as_ref().ok_or_else(|| self.not_configured())
    }

    fn current_mut(&mut self) -> Result<&mut FamilyDiscoveryState, StateError> {
        let err = self.not_configured();
        self.state.as_mut().ok_or(err)
    }

    fn not_configured(&self) -> StateError {
        StateError::NotConfigured {
            device_id: self.key.device_id.clone(),
            family: self.key.family.clone(),
        }
    }

    fn invalid(&self, action: &'static str, phase: DiscoveryPhase) -> StateError {
        StateError::InvalidTransition {
            family: self.key.family.clone(),
            action,
            phase,
        }
    }

    pub fn configure(&mut self, config: &FamilyDiscoveryConfig) -> Result<Update, ConfigError> {
        let settings = ScanSettings::from_config(&self.key.family, config)?;
        let generation = settings.generation;

        match self.state.as_ref().map(|s| (s.generation, s.phase)) {
            Some((current, _)) if is_stale(&generation, &current) => {
                log::debug!(
                    "{}: dropping config for generation {generation}, current is {current}",
                    self.key
                );
                Ok(Update::Stale {
                    received: generation,
                    current,
                })
            }
            Some((current, phase)) if current == generation => {
                self.settings = Some(settings);
                Ok(Update::Unchanged(phase))
            }
            _ => {
                log::info!("{}: new generation {generation}, scan pending", self.key);
                self.settings = Some(settings);
                self.state = Some(FamilyDiscoveryState {
                    generation,
                    phase: DiscoveryPhase::Pending,
                    record_count: 0,
                    status: None,
                });
                self.last_event_no = 0;
                self.results.clear();
                self.passive.clear();
                Ok(Update::Applied(DiscoveryPhase::Pending))
            }
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Update, StateError> {
        let phase = self.current()?.phase;
        if phase != DiscoveryPhase::Pending {
            return Err(self.invalid("start", phase));
        }
        let message = format!("Scan started for family {}", self.key.family);
        let state = self.current_mut()?;
        state.phase = DiscoveryPhase::Active;
        state.status = Some(Entry::new(categories::SCAN_START, message, levels::NOTICE, now));
        log::info!("{}: scan active", self.key);
        Ok(Update::Applied(DiscoveryPhase::Active))
    }

    /// Advance an active scan; completes it once `elapsed_sec` reaches the configured duration.
    pub fn tick(
        &mut self,
        generation: Generation,
        elapsed_sec: u64,
        now: DateTime<Utc>,
    ) -> Result<Update, StateError> {
        let current = self.current()?;
        if is_stale(&generation, &current.generation) {
            log::debug!(
                "{}: dropping tick for generation {generation}, current is {}",
                self.key,
                current.generation
            );
            return Ok(Update::Stale {
                received: generation,
                current: current.generation,
            });
        }
        if generation != current.generation {
            log::debug!("{}: ignoring tick for unconfigured generation {generation}", self.key);
            return Ok(Update::Unchanged(current.phase));
        }
        if current.phase != DiscoveryPhase::Active {
            return Ok(Update::Unchanged(current.phase));
        }

        let duration = self.settings.as_ref().and_then(|s| s.scan_duration_sec);
        match duration {
            Some(duration) if elapsed_sec >= duration => {
                let message = format!(
                    "Scan complete for family {} after {elapsed_sec}s",
                    self.key.family
                );
                let state = self.current_mut()?;
                state.phase = DiscoveryPhase::Done;
                state.status = Some(Entry::new(categories::SCAN_DONE, message, levels::INFO, now));
                log::info!("{}: scan done", self.key);
                Ok(Update::Applied(DiscoveryPhase::Done))
            }
            _ => Ok(Update::Unchanged(DiscoveryPhase::Active)),
        }
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<Update, StateError> {
        let phase = self.current()?.phase;
        if phase.is_terminal() {
            return Err(self.invalid("stop", phase));
        }
        let message = format!("Scan stopped for family {} while {phase}", self.key.family);
        let state = self.current_mut()?;
        state.phase = DiscoveryPhase::Stopped;
        state.status = Some(Entry::new(categories::SCAN_STOP, message, levels::NOTICE, now));
        log::info!("{}: scan stopped", self.key);
        Ok(Update::Applied(DiscoveryPhase::Stopped))
    }

    /// Accept one scan result for the active generation, merged by `scan_addr`.
    pub fn record_result(
        &mut self,
        generation: Generation,
        events: DiscoveryEvents,
    ) -> Result<Update, CoordError> {
        let addr = events
            .scan_addr
            .clone()
            .ok_or(SchemaError::MissingField("scan_addr"))?;
        let current = self.current()?;
        if is_stale(&generation, &current.generation) {
            log::debug!(
                "{}: dropping result for {addr} from generation {generation}, current is {}",
                self.key,
                current.generation
            );
            return Ok(Update::Stale {
                received: generation,
                current: current.generation,
            });
        }
        if generation != current.generation || current.phase != DiscoveryPhase::Active {
            log::debug!(
                "{}: ignoring result for {addr} (generation {generation}, phase {})",
                self.key,
                current.phase
            );
            return Ok(Update::Unchanged(current.phase));
        }

        self.accept(addr, events, generation);
        Ok(Update::Unchanged(DiscoveryPhase::Active))
    }

    fn accept(&mut self, addr: String, mut events: DiscoveryEvents, generation: Generation) {
        self.last_event_no += 1;
        events.generation = Some(generation);
        events.scan_family = Some(self.key.family.clone());
        events.event_no = Some(self.last_event_no);
        log::debug!("{}: recorded {addr} as event {}", self.key, self.last_event_no);
        self.results.insert(addr, events);
        if let Some(state) = self.state.as_mut() {
            state.record_count += 1;
        }
    }

    /// Hold an out-of-band sighting until the passive holdoff has elapsed.
    pub fn observe_passive(&mut self, events: DiscoveryEvents, at: DateTime<Utc>) -> Result<(), CoordError> {
        let addr = events
            .scan_addr
            .clone()
            .ok_or(SchemaError::MissingField("scan_addr"))?;
        self.current()?;
        self.passive.observe(&addr, events, at);
        Ok(())
    }

    pub fn withdraw_passive(&mut self, addr: &str) -> bool {
        self.passive.withdraw(addr)
    }

    /// Move held sightings past the holdoff into the results. Returns how many were promoted.
    pub fn promote_passive(&mut self, now: DateTime<Utc>) -> Result<usize, StateError> {
        let generation = self.current()?.generation;
        let holdoff = self
            .settings
            .as_ref()
            .map(ScanSettings::passive_holdoff)
            .unwrap_or_else(Duration::zero);
        let released = self.passive.release(holdoff, now);
        let promoted = released.len();
        for (addr, events) in released {
            self.accept(addr, events, generation);
        }
        if promoted > 0 {
            log::info!("{}: promoted {promoted} passive sighting(s)", self.key);
        }
        Ok(promoted)
    }

    /// Results keyed by address, each resolved to `depth` (or the configured `enumerate` depth).
    pub fn results(&self, depth: Option<Depth>) -> Result<BTreeMap<String, DiscoveryEvents>, ConfigError> {
        let depth = depth.or_else(|| self.settings.as_ref().and_then(|s| s.enumerate));
        self.results
            .iter()
            .map(|(addr, events)| {
                resolve(events, DepthContext::Discovery, depth).map(|tree| (addr.clone(), tree))
            })
            .collect()
    }
}
