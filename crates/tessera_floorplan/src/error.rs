//! Orchestrator error types.

use tessera_config::ConfigError;
use tessera_engine::EngineError;
use tessera_model::ModelError;

/// Errors that stop a floorplanning run.
#[derive(Debug, thiserror::Error)]
pub enum FloorplanError {
    /// Zero slots were requested.
    #[error("slot count must be positive")]
    NoSlots,

    /// A per-task input vector does not have one entry per task.
    #[error("{what} has {got} entries, expected {expected}")]
    LengthMismatch {
        /// Which vector was wrong.
        what: &'static str,
        /// Number of tasks.
        expected: usize,
        /// Entries supplied.
        got: usize,
    },

    /// A time budget could not be represented.
    #[error("invalid time budget {0} s")]
    InvalidBudget(f64),

    /// The configuration could not be loaded or resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The task model rejected a value.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The engine refused the input or the backend failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(FloorplanError::NoSlots.to_string(), "slot count must be positive");
        let err = FloorplanError::LengthMismatch {
            what: "wcet vector",
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "wcet vector has 2 entries, expected 3");
    }

    #[test]
    fn wraps_engine_errors() {
        let err = FloorplanError::from(EngineError::NoSlots);
        assert_eq!(err.to_string(), "at least one slot must be requested");
    }
}
