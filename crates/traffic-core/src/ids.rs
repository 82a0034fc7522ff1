//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony. The inner integer is `pub` to allow
//! direct indexing into CSR `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.
//!
//! Road-network nodes are addressed externally by a stable string id (§3 of
//! the data model); `NodeId` is the internal dense index a loaded graph
//! assigns to each string id. Vehicle ids are *not* represented by this
//! macro — they are mode-prefixed strings (`car_17`) backed by a single
//! engine-scoped counter, which a plain `u32` sequence number does not
//! capture on its own; see [`crate::transport`] and the `traffic-vehicle`
//! crate for the full identity type.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Dense index of a road-network node, assigned at graph load time.
    pub struct NodeId(u32);
}

typed_id! {
    /// Dense index of a directed road-network edge in CSR storage.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Sequence number backing a vehicle's mode-prefixed identity string.
    pub struct VehicleId(u32);
}

typed_id! {
    /// Sequence number for accident records. Blockages have no analogous id —
    /// they are keyed directly by the `EdgeKey` they occupy (§3, §6).
    pub struct AccidentId(u32);
}
