//! Validation errors for platforms, tasksets and tasks.

use crate::task::TaskStatus;
use tessera_common::{HwTaskId, SwTaskId};

/// Errors raised while building or mutating the task model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A platform needs at least one resource type.
    #[error("platform must have at least one resource type")]
    NoResources,

    /// A per-resource vector has the wrong length.
    #[error("{what} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// Which vector was wrong.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// A value that must be finite and non-negative was not.
    #[error("{what} must be finite and non-negative, got {value}")]
    InvalidValue {
        /// Which value was wrong.
        what: String,
        /// The rejected value.
        value: f64,
    },

    /// A hardware task id is out of range.
    #[error("unknown hardware task #{0}")]
    UnknownHwTask(HwTaskId),

    /// A software task id is out of range.
    #[error("unknown software task #{0}")]
    UnknownSwTask(SwTaskId),

    /// A taskset must hold at least one hardware task.
    #[error("taskset has no hardware tasks")]
    EmptyTaskset,

    /// A hardware task's owning software task does not list it.
    #[error("hardware task #{hw} names software task #{sw}, which does not invoke it")]
    InconsistentOwner {
        /// The hardware task.
        hw: HwTaskId,
        /// Its declared owner.
        sw: SwTaskId,
    },

    /// A scheduling task id matched no task.
    #[error("no task with id {0}")]
    UnknownTask(u32),

    /// A status change skipped or reversed a state.
    #[error("task {id}: illegal status change {from:?} -> {to:?}")]
    IllegalTransition {
        /// Task id.
        id: u32,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// A generator was asked for something it cannot produce.
    #[error("invalid generator input: {0}")]
    Generator(String),

    /// A JSON task list failed to parse.
    #[error("invalid task list: {0}")]
    Json(#[from] serde_json::Error),
}
