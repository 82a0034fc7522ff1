//! `SimError` — the engine's crate-scoped error type (§7 "Invalid input").
//!
//! Most of §7's error kinds are *not* represented here: duplicate blockage,
//! missing accident/blockage id, and "no path at reroute" are all modeled as
//! `bool`/no-op outcomes on the relevant methods rather than as errors,
//! matching §7's "no-op returning success=false" wording. `SimError`
//! covers only the cases that are genuinely exceptional for a Rust caller:
//! an out-of-range node id, a spawn that found no usable path, and a graph
//! file that failed to load.

use thiserror::Error;
use traffic_core::NodeId;
use traffic_graph::GraphError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("node {0} is out of range for this engine's graph")]
    UnknownNode(NodeId),

    #[error("no directed edge from {0} to {1}")]
    UnknownEdge(NodeId, NodeId),

    #[error("no path from {start} to {goal}")]
    NoPath { start: NodeId, goal: NodeId },

    #[error("unknown vehicle id")]
    UnknownVehicle,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type SimResult<T> = Result<T, SimError>;
