//! Diagnostic codes for preprocessing problems.
//!
//! Warning codes `W101`--`W104` cover directives the preprocessor had to
//! ignore. Error codes `E105`--`E107` cover recursion it had to cut off and
//! included files it could not read.

use vunit_diagnostics::{Category, Diagnostic, DiagnosticCode};
use vunit_source::Span;

/// Malformed directive argument.
pub const W101: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 101,
};

/// `` `undef `` of a macro that is not defined.
pub const W102: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 102,
};

/// Conditional directive without a matching `` `ifdef `` or `` `endif ``.
pub const W103: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 103,
};

/// Macro call whose actual arguments do not fit the definition.
pub const W104: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 104,
};

/// A file includes itself, directly or indirectly.
pub const E105: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 105,
};

/// A macro expands to itself.
pub const E106: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 106,
};

/// An included file exists but could not be read or scanned.
pub const E107: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 107,
};

/// Warning for a directive that is missing or has a bad argument.
pub fn bad_argument(directive: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(W101, format!("bad argument to `{directive}"), span)
}

/// Warning for a conditional that is never closed.
pub fn unterminated_conditional(directive: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W103,
        format!("end of file reached when parsing `{directive}"),
        span,
    )
}

/// Warning for `` `else ``/`` `elsif ``/`` `endif `` without an open conditional.
pub fn unmatched_conditional(directive: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(W103, format!("`{directive} without matching `ifdef"), span)
}
