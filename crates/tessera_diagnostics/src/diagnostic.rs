//! Structured diagnostic messages with severity, codes, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use crate::subject::Subject;
use serde::{Deserialize, Serialize};

/// A structured diagnostic message.
///
/// Each diagnostic includes a severity level and code, a primary message, the
/// [`Subject`] it concerns, and optional notes and help text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The entity the diagnostic concerns.
    pub subject: Subject,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        subject: Subject,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            subject,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Error, code, message, subject)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Warning, code, message, subject)
    }

    /// Creates a new informational note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::with_severity(Severity::Note, code, message, subject)
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;
    use tessera_common::SlotId;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Solver, 201);
        let diag = Diagnostic::error(code, "model is infeasible", Subject::None);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "model is infeasible");
        assert_eq!(diag.code.to_string(), "S201");
    }

    #[test]
    fn create_note() {
        let code = DiagnosticCode::new(Category::Solver, 1);
        let diag = Diagnostic::note(code, "slot placed", Subject::Slot(SlotId::from_raw(0)));
        assert_eq!(diag.severity, Severity::Note);
        assert_eq!(diag.subject, Subject::Slot(SlotId::from_raw(0)));
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Topology, 3);
        let diag = Diagnostic::warning(code, "forbidden region clipped", Subject::Board("zybo".into()))
            .with_note("region extends past column 29")
            .with_help("check the board table");
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Config, 102);
        let diag = Diagnostic::error(code, "no tasks", Subject::Config("task".into()));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "no tasks");
        assert_eq!(back.code, code);
    }
}
