use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::schema::Generation;

/// Issues strictly increasing generation markers per subject.
///
/// Subjects are independent; issuing for one subject never waits on another.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    last_issued: DashMap<String, Generation>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_generation(&self, subject: &str) -> Generation {
        self.new_generation_at(subject, Utc::now())
    }

    /// Issue `max(now, last + ε)` for `subject`.
    pub fn new_generation_at(&self, subject: &str, now: DateTime<Utc>) -> Generation {
        let mut slot = self
            .last_issued
            .entry(subject.to_string())
            .or_insert(Generation(DateTime::<Utc>::MIN_UTC));
        let issued = std::cmp::max(Generation(now), slot.next_after());
        *slot = issued;
        log::debug!("Issued generation {issued} for {subject}");
        issued
    }

    /// Record a generation issued elsewhere so later markers stay above it.
    pub fn observe(&self, subject: &str, generation: Generation) {
        let mut slot = self
            .last_issued
            .entry(subject.to_string())
            .or_insert(generation);
        if generation > *slot {
            *slot = generation;
        }
    }
}

/// A candidate is stale iff it is older than the current generation.
pub fn is_stale(candidate: &Generation, current: &Generation) -> bool {
    candidate < current
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, secs).unwrap()
    }

    #[test]
    fn follows_wall_clock_when_it_advances() {
        let tracker = GenerationTracker::new();
        assert_eq!(tracker.new_generation_at("AHU-1/bacnet", at(0)), Generation(at(0)));
        assert_eq!(tracker.new_generation_at("AHU-1/bacnet", at(5)), Generation(at(5)));
    }

    #[test]
    fn stays_monotonic_when_clock_stalls_or_regresses() {
        let tracker = GenerationTracker::new();
        let first = tracker.new_generation_at("AHU-1/bacnet", at(10));
        let same_instant = tracker.new_generation_at("AHU-1/bacnet", at(10));
        let earlier_clock = tracker.new_generation_at("AHU-1/bacnet", at(3));
        assert!(first < same_instant);
        assert!(same_instant < earlier_clock);
        assert_eq!(same_instant, first.next_after());
    }

    #[test]
    fn subjects_are_independent() {
        let tracker = GenerationTracker::new();
        tracker.new_generation_at("AHU-1/bacnet", at(30));
        assert_eq!(tracker.new_generation_at("AHU-1/modbus", at(1)), Generation(at(1)));
    }

    #[test]
    fn observed_generations_raise_the_floor() {
        let tracker = GenerationTracker::new();
        tracker.observe("AHU-1/bacnet", Generation(at(40)));
        assert!(tracker.new_generation_at("AHU-1/bacnet", at(1)) > Generation(at(40)));
    }

    #[test]
    fn staleness() {
        assert!(is_stale(&Generation(at(1)), &Generation(at(2))));
        assert!(!is_stale(&Generation(at(2)), &Generation(at(2))));
        assert!(!is_stale(&Generation(at(3)), &Generation(at(2))));
    }
}
