//! Accident records and their registry (§3 "Accident", §4.7 "Accident
//! generation").

use rustc_hash::FxHashMap;
use traffic_core::{AccidentId, NodeId};
use traffic_config::Severity;

/// `{id, from, to, severity, created_at, duration_seconds}` (§3).
#[derive(Clone, Copy, Debug)]
pub struct Accident {
    pub id: AccidentId,
    pub from: NodeId,
    pub to: NodeId,
    pub severity: Severity,
    pub created_at: f64,
    pub duration_seconds: f64,
}

impl Accident {
    #[inline]
    pub fn is_overdue(&self, now: f64) -> bool {
        now - self.created_at > self.duration_seconds
    }
}

/// `{id → Accident}` owner map plus the monotonic id counter (§5, "event
/// ids likewise" monotonic).
#[derive(Default)]
pub struct AccidentRegistry {
    accidents: FxHashMap<AccidentId, Accident>,
    next_id: u32,
}

impl AccidentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AccidentId {
        let id = AccidentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, accident: Accident) {
        self.accidents.insert(accident.id, accident);
    }

    pub fn get(&self, id: AccidentId) -> Option<&Accident> {
        self.accidents.get(&id)
    }

    /// Remove and return the accident, `None` if `id` is unknown (§7,
    /// "Missing accident/blockage id on resolution — no-op").
    pub fn remove(&mut self, id: AccidentId) -> Option<Accident> {
        self.accidents.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Accident> {
        self.accidents.values()
    }

    pub fn len(&self) -> usize {
        self.accidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accidents.is_empty()
    }

    /// Accidents whose duration has elapsed as of `now` (§4.7 "Expiry").
    /// Does not remove them — the caller restores the multiplier first,
    /// then calls [`Self::remove`].
    pub fn overdue(&self, now: f64) -> Vec<Accident> {
        self.accidents.values().filter(|a| a.is_overdue(now)).copied().collect()
    }

    pub fn reset(&mut self) {
        self.accidents.clear();
        self.next_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accident(id: u32, created_at: f64, duration: f64) -> Accident {
        Accident {
            id: AccidentId(id),
            from: NodeId(0),
            to: NodeId(1),
            severity: Severity::Minor,
            created_at,
            duration_seconds: duration,
        }
    }

    #[test]
    fn overdue_detects_elapsed_duration() {
        let mut reg = AccidentRegistry::new();
        reg.insert(accident(0, 0.0, 10.0));
        assert!(reg.overdue(5.0).is_empty());
        assert_eq!(reg.overdue(10.1).len(), 1);
    }

    #[test]
    fn remove_missing_id_is_none() {
        let mut reg = AccidentRegistry::new();
        assert!(reg.remove(AccidentId(99)).is_none());
    }

    #[test]
    fn ids_are_monotonic_and_reset_restarts_counter() {
        let mut reg = AccidentRegistry::new();
        let a = reg.next_id();
        let b = reg.next_id();
        assert_eq!(a.0 + 1, b.0);
        reg.reset();
        assert_eq!(reg.next_id().0, 0);
    }
}
