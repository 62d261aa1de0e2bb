//! Opaque ID newtypes for floorplanning entities.
//!
//! All IDs are zero-based `u32` indices. They are `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`, and display as their raw index.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize` for slice addressing.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// A hardware task (one accelerator to be placed).
    HwTaskId
);

define_id!(
    /// A software task invoking one or more hardware tasks.
    SwTaskId
);

define_id!(
    /// A reconfigurable partition grouping hardware tasks.
    PartitionId
);

define_id!(
    /// A rectangular reconfigurable slot on the fabric.
    SlotId
);
