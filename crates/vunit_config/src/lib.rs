//! Parsing and validation of `vunit.toml` project descriptions.
//!
//! This crate reads the project file and produces a strongly-typed
//! [`ProjectConfig`] listing libraries, source files, per-file options and
//! manual dependencies. [`resolve_libraries`] and [`resolve_sources`] turn it
//! into absolute paths ready to be fed to a project.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{
    resolve_libraries, resolve_manual_dependencies, resolve_sources, ResolvedLibrary,
    ResolvedSource,
};
pub use types::*;
