//! Fatal project errors.
//!
//! Anything that prevents a definite compile order is returned as a
//! [`ProjectError`]. Recoverable problems go to the project's diagnostic sink
//! instead.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use vunit_cache::CacheError;
use vunit_common::UnknownFileType;

use crate::design_unit::UnitKind;

/// Errors returned by [`Project`](crate::Project) operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// `work` always means "the current library" and cannot be declared.
    #[error("library name '{name}' is not allowed")]
    IllegalLibraryName {
        /// The rejected name.
        name: String,
    },

    /// A library with the same name, ignoring case, already exists.
    #[error("library '{name}' already added as '{existing}'")]
    DuplicateLibrary {
        /// The name passed to `add_library`.
        name: String,
        /// The name the library was first added under.
        existing: String,
    },

    /// A source file names a library that was never added.
    #[error("library '{0}' has not been added")]
    UnknownLibrary(String),

    /// An external library points at a path that does not exist.
    #[error("External library '{}' does not exist", .path.display())]
    ExternalLibraryMissing {
        /// The configured path.
        path: PathBuf,
    },

    /// An external library points at a file.
    #[error("External library must be a directory. Got '{}'", .path.display())]
    ExternalLibraryNotDirectory {
        /// The configured path.
        path: PathBuf,
    },

    /// A primary unit is declared in two different files of one library.
    #[error(
        "{kind} '{name}' in library '{library}' is declared in both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateDesignUnit {
        /// Kind of the unit.
        kind: UnitKind,
        /// Unit name as first declared.
        name: String,
        /// Owning library.
        library: String,
        /// The file that already declares it.
        first: PathBuf,
        /// The file being added.
        second: PathBuf,
    },

    /// The language of a file could not be derived from its extension.
    #[error(transparent)]
    UnknownFileType(#[from] UnknownFileType),

    /// A source file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The hash store could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Files depend on each other in a loop.
    #[error("found circular dependency {}", display_chain(.chain))]
    CircularDependency {
        /// The files of the loop in dependency order, first file repeated last.
        chain: Vec<PathBuf>,
    },

    /// An entity instantiated without an architecture has several and no
    /// configuration selects one.
    #[error(
        "entity '{library}.{entity}' instantiated in {} has architectures {} and no configuration selects one",
        .referenced_from.display(),
        .architectures.join(", ")
    )]
    AmbiguousArchitecture {
        /// Library of the entity.
        library: String,
        /// The entity.
        entity: String,
        /// Its architectures, in declaration order.
        architectures: Vec<String>,
        /// The instantiating file.
        referenced_from: PathBuf,
    },

    /// A path or id does not refer to a file of this project.
    #[error("source file '{0}' is not part of the project")]
    UnknownSourceFile(String),

    /// A compile option name is not of the form `tool.option`.
    #[error("invalid compile option name '{name}', expected 'tool.option'")]
    InvalidCompileOption {
        /// The rejected name.
        name: String,
    },
}

impl ProjectError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn display_chain(chain: &[PathBuf]) -> String {
    let mut out = String::new();
    for (i, path) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(" -> ");
        }
        let _ = write!(out, "{}", path.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_library() {
        let err = ProjectError::DuplicateLibrary {
            name: "lib".to_string(),
            existing: "Lib".to_string(),
        };
        assert_eq!(err.to_string(), "library 'lib' already added as 'Lib'");
    }

    #[test]
    fn display_circular_dependency() {
        let err = ProjectError::CircularDependency {
            chain: vec!["a.vhd".into(), "b.vhd".into(), "a.vhd".into()],
        };
        assert_eq!(
            err.to_string(),
            "found circular dependency a.vhd -> b.vhd -> a.vhd"
        );
    }

    #[test]
    fn display_external_library() {
        let err = ProjectError::ExternalLibraryMissing {
            path: "/opt/vendor".into(),
        };
        assert_eq!(err.to_string(), "External library '/opt/vendor' does not exist");
        let err = ProjectError::ExternalLibraryNotDirectory {
            path: "/opt/vendor.txt".into(),
        };
        assert_eq!(
            err.to_string(),
            "External library must be a directory. Got '/opt/vendor.txt'"
        );
    }

    #[test]
    fn display_ambiguous_architecture() {
        let err = ProjectError::AmbiguousArchitecture {
            library: "lib".to_string(),
            entity: "ent".to_string(),
            architectures: vec!["a1".to_string(), "a2".to_string()],
            referenced_from: "top.vhd".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'lib.ent'"));
        assert!(msg.contains("a1, a2"));
    }
}
