//! Structured warnings and notes emitted while building a project.
//!
//! Fatal problems are returned as `Err` values by the crates that detect them.
//! Everything a caller may choose to surface or ignore (unresolved references,
//! duplicate secondary units, files that failed to scan) is recorded as a
//! [`Diagnostic`] in a [`DiagnosticSink`] and can be printed with a
//! [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
