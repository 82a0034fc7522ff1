//! `traffic-graph` — the road network graph store (C1).
//!
//! | Module      | Contents                                          |
//! |-------------|-----------------------------------------------------|
//! | [`network`] | `RoadNetwork`, `RoadNetworkBuilder` (CSR storage)    |
//! | [`mode_set`]| `ModeSet`, a compact `VehicleKind` bitset             |
//! | [`loader`]  | JSON graph file parsing (§6)                          |
//! | [`error`]   | `GraphError`, `GraphResult`                           |

pub mod error;
pub mod loader;
pub mod mode_set;
pub mod network;

pub use error::{GraphError, GraphResult};
pub use loader::{load_graph_file, load_graph_str};
pub use mode_set::ModeSet;
pub use network::{RoadNetwork, RoadNetworkBuilder};
