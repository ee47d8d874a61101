//! Loaded HDL source text, span tracking, and path normalization.
//!
//! The [`SourceDb`] owns the text of every file scanned during a session so
//! that diagnostics can be rendered with line/column coordinates long after
//! the scanners have finished.

#![warn(missing_docs)]

pub mod path;
pub mod source_db;
pub mod source_text;
pub mod span;

pub use path::normalize_path;
pub use source_db::{ResolvedSpan, SourceDb};
pub use source_text::{decode_latin1, SourceText};
pub use span::{FileId, Span};
