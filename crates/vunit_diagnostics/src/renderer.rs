//! Terminal rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use vunit_source::SourceDb;

/// Formats diagnostics for some output target.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-like layout:
///
/// ```text
/// warning[W301]: failed to find library 'uvvm'
///   --> src/tb.vhd:3:5
///    |
///  3 | use uvvm.util_pkg.all;
///    |
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI colors for the header.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let text = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return text;
        }
        let ansi = match diag.severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
        };
        format!("{ansi}{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);

        if let (Some(resolved), Some(text)) =
            (source_db.resolve_span(diag.span), source_db.get(diag.span.file))
        {
            let line_num = resolved.line.to_string();
            let pad = " ".repeat(line_num.len());
            out.push_str(&format!("{pad}--> {resolved}\n"));
            out.push_str(&format!("{pad} |\n"));
            out.push_str(&format!("{line_num} | {}\n", text.line_at(diag.span.start)));
            out.push_str(&format!("{pad} |\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}
