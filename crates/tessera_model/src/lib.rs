//! Resource and task model for the Tessera floorplanner.
//!
//! - [`Platform`]: resource capacities and reconfiguration rates.
//! - [`Taskset`]: hardware tasks (demand, WCET) and the software tasks that
//!   invoke them, as consumed by the floorplanning engine.
//! - [`Task`]: the scheduling-facing task entity with its status state machine
//!   and dependency edges, consumed by the clustering path.
//! - [`generate`]: seeded random taskset and slack generation for experiments.

#![warn(missing_docs)]

pub mod error;
pub mod generate;
pub mod platform;
pub mod task;
pub mod taskset;

pub use error::ModelError;
pub use platform::Platform;
pub use task::{load_tasks_json, Task, TaskStatus};
pub use taskset::{HwTask, SwTask, Taskset};
