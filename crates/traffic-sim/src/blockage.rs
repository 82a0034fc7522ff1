//! Blockage records and their registry (§3 "Blockage", §4.7 "Blockage
//! generation").
//!
//! Unlike accidents, blockages reach the engine through two different call
//! sites with different expiry behavior. A statistically generated blockage
//! (§4.7) carries a sampled duration and auto-expires. An explicit
//! `block_road` call carries no duration at all — it stays blocked until an
//! explicit `unblock_road` — which this registry represents as
//! `duration_seconds: None` rather than inventing a duration the caller
//! never supplied (see DESIGN.md).

use rustc_hash::FxHashMap;
use traffic_core::EdgeKey;

/// `{from, to, reason, created_at, duration_seconds}` (§3). `from`/`to` live
/// in the registry's key, not duplicated in the value.
#[derive(Clone, Debug)]
pub struct Blockage {
    pub reason: String,
    pub created_at: f64,
    pub duration_seconds: Option<f64>,
}

impl Blockage {
    #[inline]
    pub fn is_overdue(&self, now: f64) -> bool {
        match self.duration_seconds {
            Some(d) => now - self.created_at > d,
            None => false,
        }
    }
}

#[derive(Default)]
pub struct BlockageRegistry {
    blockages: FxHashMap<EdgeKey, Blockage>,
}

impl BlockageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, edge: EdgeKey) -> bool {
        self.blockages.contains_key(&edge)
    }

    /// `true` if inserted, `false` if `edge` was already blocked (§7,
    /// "Duplicate blockage ... no-op returning success=false").
    pub fn insert_manual(&mut self, edge: EdgeKey, reason: String, created_at: f64) -> bool {
        if self.blockages.contains_key(&edge) {
            return false;
        }
        self.blockages.insert(edge, Blockage { reason, created_at, duration_seconds: None });
        true
    }

    /// Insert a statistically generated blockage with an expiry (§4.7).
    /// Callers are expected to have already checked `!contains(edge)`.
    pub fn insert_generated(&mut self, edge: EdgeKey, reason: String, created_at: f64, duration_seconds: f64) {
        self.blockages.insert(edge, Blockage { reason, created_at, duration_seconds: Some(duration_seconds) });
    }

    pub fn remove(&mut self, edge: EdgeKey) -> Option<Blockage> {
        self.blockages.remove(&edge)
    }

    pub fn get(&self, edge: EdgeKey) -> Option<&Blockage> {
        self.blockages.get(&edge)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeKey, &Blockage)> {
        self.blockages.iter()
    }

    pub fn len(&self) -> usize {
        self.blockages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockages.is_empty()
    }

    /// Edges whose generated blockage has expired as of `now`. Manual
    /// blockages (`duration_seconds: None`) never appear here.
    pub fn overdue(&self, now: f64) -> Vec<EdgeKey> {
        self.blockages.iter().filter(|(_, b)| b.is_overdue(now)).map(|(&k, _)| k).collect()
    }

    pub fn reset(&mut self) {
        self.blockages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::NodeId;

    #[test]
    fn manual_insert_rejects_duplicate() {
        let mut reg = BlockageRegistry::new();
        let edge = EdgeKey::new(NodeId(0), NodeId(1));
        assert!(reg.insert_manual(edge, "construction".into(), 0.0));
        assert!(!reg.insert_manual(edge, "construction".into(), 1.0));
    }

    #[test]
    fn manual_blockage_never_expires() {
        let mut reg = BlockageRegistry::new();
        let edge = EdgeKey::new(NodeId(0), NodeId(1));
        reg.insert_manual(edge, "construction".into(), 0.0);
        assert!(reg.overdue(1_000_000.0).is_empty());
    }

    #[test]
    fn generated_blockage_expires_after_duration() {
        let mut reg = BlockageRegistry::new();
        let edge = EdgeKey::new(NodeId(0), NodeId(1));
        reg.insert_generated(edge, "event".into(), 0.0, 30.0);
        assert!(reg.overdue(29.0).is_empty());
        assert_eq!(reg.overdue(30.1), vec![edge]);
    }
}
