//! Incremental compile-order engine for VHDL and Verilog projects.
//!
//! A [`Project`] holds libraries of source files. Adding a file scans it for
//! the design units it declares and the units it references. From those the
//! project derives a [`DependencyGraph`] between files, orders it
//! topologically and, using hashes recorded by [`Project::update`], reports
//! which files need recompiling.
//!
//! Two graph levels exist. Declaration-level edges follow `use` clauses,
//! secondary units and explicit entity references; this is enough to analyze
//! files. Implementation-level edges also bind instantiations to concrete
//! entities, modules and architectures, which elaboration needs.
//!
//! Problems that still allow an order, such as a reference to a library that
//! does not exist, are reported to [`Project::diagnostics`]. Problems that do
//! not are returned as [`ProjectError`].

#![warn(missing_docs)]

mod config;
pub mod design_unit;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod library;
pub mod project;
mod resolve;
pub mod source_file;

pub use design_unit::{DesignUnit, UnitKind};
pub use error::ProjectError;
pub use graph::{Cycle, DependencyGraph};
pub use library::{Library, LibraryKind};
pub use project::{Project, ProjectOptions, DEFAULT_BUILTIN_LIBRARIES};
pub use source_file::{DesignSummary, SourceFile, SourceFileId, SourceFileOptions};
