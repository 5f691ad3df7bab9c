//! Holdoff gate for passively observed devices.
//!
//! Sightings that arrive outside an active scan are held until they have been
//! continuously present for the family's `passive_sec`, so that flapping
//! devices do not churn the result tree.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::DiscoveryEvents;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct HeldSighting {
    first_seen: DateTime<Utc>,
    events: DiscoveryEvents,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PassiveGate {
    held: BTreeMap<String, HeldSighting>,
}

impl PassiveGate {
    /// Hold a sighting. Re-sighting refreshes the payload but keeps the first-seen time.
    pub fn observe(&mut self, addr: &str, events: DiscoveryEvents, at: DateTime<Utc>) {
        self.held
            .entry(addr.to_string())
            .and_modify(|held| held.events = events.clone())
            .or_insert(HeldSighting {
                first_seen: at,
                events,
            });
    }

    /// Forget a sighting before it is promoted. Returns whether one was held.
    pub fn withdraw(&mut self, addr: &str) -> bool {
        self.held.remove(addr).is_some()
    }

    /// Remove and return every sighting held for at least `holdoff`.
    pub fn release(&mut self, holdoff: Duration, now: DateTime<Utc>) -> Vec<(String, DiscoveryEvents)> {
        let ready: Vec<String> = self
            .held
            .iter()
            .filter(|(_, held)| now - held.first_seen >= holdoff)
            .map(|(addr, _)| addr.clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|addr| self.held.remove(&addr).map(|held| (addr, held.events)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, secs).unwrap()
    }

    fn sighting(addr: &str, network: &str) -> DiscoveryEvents {
        DiscoveryEvents {
            scan_addr: Some(addr.to_string()),
            system: Some(serde_json::json!({"network": network})),
            ..DiscoveryEvents::default()
        }
    }

    #[test]
    fn held_until_holdoff_elapses() {
        let mut gate = PassiveGate::default();
        gate.observe("192.168.1.20", sighting("192.168.1.20", "a"), at(0));

        assert!(gate.release(Duration::seconds(30), at(29)).is_empty());
        let released = gate.release(Duration::seconds(30), at(30));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].0, "192.168.1.20");
        assert!(gate.is_empty());
    }

    #[test]
    fn resighting_keeps_first_seen_but_refreshes_payload() {
        let mut gate = PassiveGate::default();
        gate.observe("10.0.0.7", sighting("10.0.0.7", "old"), at(0));
        gate.observe("10.0.0.7", sighting("10.0.0.7", "new"), at(20));

        let released = gate.release(Duration::seconds(25), at(25));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].1.system, Some(serde_json::json!({"network": "new"})));
    }

    #[test]
    fn withdrawn_sighting_never_promotes() {
        let mut gate = PassiveGate::default();
        gate.observe("10.0.0.9", sighting("10.0.0.9", "a"), at(0));
        assert!(gate.withdraw("10.0.0.9"));
        assert!(!gate.withdraw("10.0.0.9"));
        assert!(gate.release(Duration::seconds(0), at(59)).is_empty());
    }
}
