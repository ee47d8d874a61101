//! Diagnostic codes for recoverable project problems.
//!
//! Warning codes `W301`--`W308` cover references the dependency scan could
//! not resolve and tolerated duplicate declarations. `E301` marks a file that
//! could not be scanned. Notes `I301`--`I302` report re-added files.

use std::path::Path;

use vunit_diagnostics::{Category, Diagnostic, DiagnosticCode};
use vunit_source::Span;

/// Reference to a library that is not part of the project.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// Reference to a primary unit missing from its library.
pub const W302: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 302,
};

/// Component instantiation without a matching entity or module.
pub const W303: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 303,
};

/// Reference to an architecture the entity does not have.
pub const W304: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 304,
};

/// Secondary unit declared again in another file.
pub const W305: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 305,
};

/// Primary unit declared twice in the same file.
pub const W306: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 306,
};

/// Component name matching entities in several libraries.
pub const W307: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 307,
};

/// Default architecture binding left open in a graph built for inspection.
pub const W308: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 308,
};

/// A file could not be scanned and contributes no design units.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// A byte-identical file was added again.
pub const I301: DiagnosticCode = DiagnosticCode {
    category: Category::Info,
    number: 301,
};

/// A file was added again with new content and replaced in place.
pub const I302: DiagnosticCode = DiagnosticCode {
    category: Category::Info,
    number: 302,
};

/// Creates a warning for a reference into an unknown library.
pub fn unknown_library(library: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(W301, format!("failed to find library '{library}'"), span)
}

/// Creates a warning for a reference to a missing primary unit.
pub fn missing_primary_unit(unit: &str, library: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W302,
        format!("failed to find a primary design unit '{unit}' in library '{library}'"),
        span,
    )
}

/// Creates a warning for a component no entity matches.
pub fn unmatched_component(component: &str, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W303,
        format!("failed to find a matching entity for component '{component}'"),
        span,
    )
    .with_note("the simulator may still bind it to a built-in or vendor library")
}

/// Creates a warning for a reference to a missing architecture.
pub fn missing_architecture(
    file: &Path,
    library: &str,
    entity: &str,
    architecture: &str,
    span: Span,
) -> Diagnostic {
    Diagnostic::warning(
        W304,
        format!(
            "{} depends on a missing architecture '{architecture}' of entity '{library}.{entity}'",
            file.display()
        ),
        span,
    )
}

/// Creates a warning for a secondary unit declared in a second file.
pub fn duplicate_secondary_unit(description: &str, previous: &Path, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W305,
        format!("{description} previously defined in {}", previous.display()),
        span,
    )
}

/// Creates a warning for a primary unit declared twice in one file.
pub fn duplicate_in_same_file(description: &str, file: &Path, span: Span) -> Diagnostic {
    Diagnostic::warning(
        W306,
        format!("{description} declared twice in {}", file.display()),
        span,
    )
    .with_note("the first declaration is kept")
}

/// Creates a warning for a component matching entities in several libraries.
pub fn ambiguous_component(component: &str, libraries: &[String], span: Span) -> Diagnostic {
    Diagnostic::warning(
        W307,
        format!(
            "component '{component}' matches entities in libraries {}",
            libraries.join(", ")
        ),
        span,
    )
}

/// Creates a warning for an unresolved default architecture binding.
pub fn ambiguous_architecture(
    library: &str,
    entity: &str,
    architectures: &[String],
    span: Span,
) -> Diagnostic {
    Diagnostic::warning(
        W308,
        format!(
            "entity '{library}.{entity}' has architectures {} and no configuration selects one",
            architectures.join(", ")
        ),
        span,
    )
}

/// Creates an error for a file that could not be scanned.
pub fn scan_failed(file: &Path, message: &str, span: Span) -> Diagnostic {
    Diagnostic::error(
        E301,
        format!("failed to parse {}: {message}", file.display()),
        span,
    )
    .with_note("the file is kept in the compile order without design units")
}

/// Creates a note for an identical file added twice.
pub fn identical_file_readded(file: &Path, library: &str) -> Diagnostic {
    Diagnostic::note(
        I301,
        format!(
            "ignoring duplicate add of identical file {} to library '{library}'",
            file.display()
        ),
        Span::DUMMY,
    )
}

/// Creates a note for a file replaced by a new version.
pub fn file_replaced(file: &Path, library: &str) -> Diagnostic {
    Diagnostic::note(
        I302,
        format!(
            "replacing changed file {} in library '{library}'",
            file.display()
        ),
        Span::DUMMY,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vunit_diagnostics::Severity;

    #[test]
    fn codes_render_with_category_prefix() {
        assert_eq!(W301.to_string(), "W301");
        assert_eq!(E301.to_string(), "E301");
        assert_eq!(I302.to_string(), "I302");
    }

    #[test]
    fn helpers_set_severity_and_message() {
        let diag = unknown_library("uvvm", Span::DUMMY);
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "failed to find library 'uvvm'");

        let diag = scan_failed(Path::new("bad.vhd"), "unterminated string", Span::DUMMY);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code, E301);
        assert_eq!(diag.notes.len(), 1);

        let diag = identical_file_readded(Path::new("a.vhd"), "lib");
        assert_eq!(diag.severity, Severity::Note);
    }
}
