//! `EdgeKey` — the canonical key for every per-edge map in the engine
//! (multipliers, capacities, occupancy, blocked set).
//!
//! An `EdgeKey` pairs two `NodeId`s; unlike `EdgeId` (a dense CSR index) it
//! is meaningful independent of any particular graph's internal layout, and
//! is what the simulator, analyzer, and pathfinder pass around when talking
//! about "this directed road" rather than "this row in the edge array".

use std::fmt;

use crate::NodeId;

/// A directed `(from, to)` pair identifying one road.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
}

impl EdgeKey {
    #[inline]
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// Wire serialization is the comma-joined string `"u,v"` (§6), where `u`
/// and `v` are the node indices — callers that need the original string
/// node ids must resolve them through the graph's name table first.
impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.from.0, self.to.0)
    }
}
