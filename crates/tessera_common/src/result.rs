//! Common result and error types for the Tessera workspace.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in Tessera), not a
/// user-facing problem. Problems with the user's boards or tasks are reported
/// through `tessera_diagnostics` or through the owning crate's error enum.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Tessera, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("slot table out of sync");
        assert_eq!(format!("{err}"), "internal error: slot table out of sync");
    }

    #[test]
    fn err_path() {
        let r: TesseraResult<u32> = Err(InternalError::new("missing variable"));
        assert_eq!(r.err().unwrap().message, "missing variable");
    }

    #[test]
    fn from_string() {
        let err: InternalError = format!("slot {} unknown", 3).into();
        assert_eq!(err.message, "slot 3 unknown");
    }
}
