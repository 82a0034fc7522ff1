//! A compact bitset over `VehicleKind`, used as an edge's `allowed_modes`.

use traffic_core::VehicleKind;

const CAR_BIT: u8 = 0b001;
const BICYCLE_BIT: u8 = 0b010;
const PEDESTRIAN_BIT: u8 = 0b100;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY: ModeSet = ModeSet(0);
    pub const ALL: ModeSet = ModeSet(CAR_BIT | BICYCLE_BIT | PEDESTRIAN_BIT);

    fn bit(kind: VehicleKind) -> u8 {
        match kind {
            VehicleKind::Car => CAR_BIT,
            VehicleKind::Bicycle => BICYCLE_BIT,
            VehicleKind::Pedestrian => PEDESTRIAN_BIT,
        }
    }

    pub fn insert(&mut self, kind: VehicleKind) {
        self.0 |= Self::bit(kind);
    }

    #[inline]
    pub fn contains(self, kind: VehicleKind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    /// Parse from the JSON `allowed_modes` string list; unrecognised strings
    /// are ignored rather than rejected, matching the loader's tolerant
    /// stance on the rest of the graph file format.
    pub fn from_strs<'a>(modes: impl IntoIterator<Item = &'a str>) -> ModeSet {
        let mut set = ModeSet::EMPTY;
        for m in modes {
            if let Some(kind) = VehicleKind::from_str(m) {
                set.insert(kind);
            }
        }
        set
    }
}
