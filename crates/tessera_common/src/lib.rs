//! Shared foundational types used across the Tessera floorplanner.
//!
//! This crate provides the opaque ID newtypes for tasks, partitions and slots,
//! the [`ResourceKind`] enumeration of fabric resource types, and the common
//! internal-error result type.

#![warn(missing_docs)]

pub mod ids;
pub mod resource;
pub mod result;

pub use ids::{HwTaskId, PartitionId, SlotId, SwTaskId};
pub use resource::ResourceKind;
pub use result::{InternalError, TesseraResult};
