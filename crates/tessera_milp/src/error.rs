//! Backend failure type.

/// A solver backend failed for a reason other than infeasibility.
///
/// Not retried: the model and settings are deterministic inputs, so a second
/// attempt with the same inputs fails the same way.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The backend reported an error.
    #[error("{backend} failed: {message}")]
    Failed {
        /// Backend name.
        backend: String,
        /// Backend-provided message.
        message: String,
    },

    /// The solver worker thread died without reporting.
    #[error("solver worker terminated unexpectedly")]
    WorkerLost,
}
