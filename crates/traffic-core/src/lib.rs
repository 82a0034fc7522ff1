//! `traffic-core` — foundational types for the urban traffic simulation engine.
//!
//! This crate is a dependency of every other crate in the workspace. It
//! intentionally has no sibling dependencies and minimal external ones (only
//! `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                           |
//! |---------------|-----------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`, `VehicleId`, `AccidentId`        |
//! | [`edge_key`]  | `EdgeKey` — the `(from, to)` wire/map key            |
//! | [`geo`]       | `Point`, planar Euclidean distance                   |
//! | [`clock`]     | `AcceleratedClock`, `SimulationTime`, `TimePeriod`   |
//! | [`rng`]       | `VehicleRng` (per-vehicle), `SimRng` (global)        |
//! | [`transport`] | `VehicleKind` enum                                   |
//! | [`error`]     | `CoreError`, `CoreResult`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|-------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.    |

pub mod clock;
pub mod edge_key;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::{AcceleratedClock, SimulationTime, TimePeriod};
pub use edge_key::EdgeKey;
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{AccidentId, EdgeId, NodeId, VehicleId};
pub use rng::{SimRng, VehicleRng};
pub use transport::VehicleKind;
