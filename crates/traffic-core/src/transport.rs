//! Vehicle kind enum shared across the workspace.
//!
//! Unlike a general-purpose mobility framework, this engine's mode set is
//! fixed by the calibration dataset it models — `car`, `bicycle`,
//! `pedestrian` — so the enum is closed (no `#[non_exhaustive]`):
//! exhaustive matching is the intended style (§9, "tagged variants instead
//! of class hierarchies").

/// The kind of a vehicle, and the travel mode used when pathfinding for it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VehicleKind {
    Car,
    Bicycle,
    Pedestrian,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Bicycle, VehicleKind::Pedestrian];

    /// Capacity units this kind consumes on the edge it occupies (§3).
    #[inline]
    pub fn capacity_usage(self) -> f32 {
        match self {
            VehicleKind::Car => 1.0,
            VehicleKind::Bicycle => 0.5,
            VehicleKind::Pedestrian => 0.2,
        }
    }

    /// Lowercase label, also used as the vehicle id's string prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Bicycle => "bicycle",
            VehicleKind::Pedestrian => "pedestrian",
        }
    }

    pub fn from_str(s: &str) -> Option<VehicleKind> {
        match s {
            "car" => Some(VehicleKind::Car),
            "bicycle" => Some(VehicleKind::Bicycle),
            "pedestrian" => Some(VehicleKind::Pedestrian),
            _ => None,
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
