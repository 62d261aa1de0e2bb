//! Engine error types.

use tessera_common::{SlotId, SwTaskId};
use tessera_milp::BackendError;
use tessera_model::ModelError;

/// Errors that stop a floorplanning run before or during the solve.
///
/// Infeasibility is not an error; it is reported as
/// [`EngineOutcome::Infeasible`](crate::EngineOutcome::Infeasible).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Zero slots were requested.
    #[error("at least one slot must be requested")]
    NoSlots,

    /// The taskset or platform failed validation.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The slack vector does not have one entry per software task.
    #[error("slack vector has {got} entries, expected one per software task ({expected})")]
    SlackLength {
        /// Number of software tasks.
        expected: usize,
        /// Entries supplied.
        got: usize,
    },

    /// A slack bound is negative or not finite.
    #[error("slack bound of software task #{sw} must be finite and non-negative, got {value}")]
    InvalidSlack {
        /// The software task.
        sw: SwTaskId,
        /// The rejected value.
        value: f64,
    },

    /// A geometric run was requested on a platform without exactly the
    /// logic, memory and DSP resource types.
    #[error("geometric floorplanning needs the resource types clb, bram and dsp; platform has {0}")]
    GeometryResources(usize),

    /// A connection names a slot that does not exist.
    #[error("connection references slot {slot}, but only {slots} slots were requested")]
    UnknownSlot {
        /// The offending slot.
        slot: SlotId,
        /// Number of requested slots.
        slots: usize,
    },

    /// An objective weight is negative or not finite.
    #[error("objective weight `{what}` must be finite and non-negative, got {value}")]
    InvalidWeight {
        /// Which weight.
        what: String,
        /// The rejected value.
        value: f64,
    },

    /// The backend failed.
    #[error("solver backend failed: {0}")]
    Backend(#[from] BackendError),

    /// The backend reported an unbounded objective, which a well-formed
    /// floorplan model never has.
    #[error("solver reported an unbounded objective")]
    Unbounded,
}
