//! `traffic-vehicle` — the `Vehicle` entity, its kinematics, and the
//! engine's vehicle owner map.
//!
//! | Module    | Contents                                        |
//! |-----------|---------------------------------------------------|
//! | [`vehicle`]| `Vehicle`, kinematics, car-following              |
//! | [`status`] | `VehicleStatus`                                    |
//! | [`store`]  | `VehicleStore`, `EdgeOccupancy`, statistics        |

pub mod status;
pub mod store;
pub mod vehicle;

pub use status::VehicleStatus;
pub use store::{EdgeOccupancy, VehicleStatistics, VehicleStore};
pub use vehicle::{classify_gap, FollowAction, Vehicle, ACCELERATION, MIN_SAFE_DISTANCE};
