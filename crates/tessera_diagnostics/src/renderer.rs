//! Diagnostic rendering for terminal and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// error[S201]: floorplan model is infeasible
///   --> constraint delay_bound[sw0]
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let ansi = match severity {
            Severity::Error => "31;1",
            Severity::Warning => "33;1",
            Severity::Note => "36;1",
            Severity::Help => "32;1",
        };
        format!("\x1b[{ansi}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        let header = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity, &header),
            diag.message
        ));
        if !diag.subject.is_none() {
            out.push_str(&format!("  --> {}\n", diag.subject));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

/// Renders each diagnostic as one line of JSON.
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        match serde_json::to_string(diag) {
            Ok(line) => line,
            Err(e) => format!("{{\"severity\":\"error\",\"message\":\"unserializable diagnostic: {e}\"}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::subject::Subject;

    #[test]
    fn render_with_subject_and_notes() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Solver, 202),
            "constraint in conflict",
            Subject::Constraint("capacity[clb]".into()),
        )
        .with_note("part of an irreducible infeasible subset")
        .with_help("raise the platform capacity or relax slack bounds");

        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("error[S202]: constraint in conflict"));
        assert!(output.contains("--> constraint capacity[clb]"));
        assert!(output.contains("= note: part of an irreducible infeasible subset"));
        assert!(output.contains("= help: raise the platform capacity"));
    }

    #[test]
    fn render_without_subject() {
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 1),
            "time budget expired",
            Subject::None,
        );
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.starts_with("warning[W001]: time budget expired"));
        assert!(!output.contains("-->"));
    }

    #[test]
    fn color_wraps_header() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 1),
            "boom",
            Subject::None,
        );
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[31;1merror[E001]\x1b[0m: boom"));
    }

    #[test]
    fn json_is_one_line() {
        let diag = Diagnostic::note(
            DiagnosticCode::new(Category::Topology, 3),
            "forbidden region clipped",
            Subject::Board("zybo".into()),
        );
        let output = JsonRenderer.render(&diag);
        assert!(!output.contains('\n'));
        let back: Diagnostic = serde_json::from_str(&output).unwrap();
        assert_eq!(back.message, "forbidden region clipped");
        assert_eq!(back.code, diag.code);
    }
}
