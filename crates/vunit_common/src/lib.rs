//! Shared foundational types used across the VUnit compile-order engine.
//!
//! This crate provides content hashing for staleness detection, case-insensitive
//! design-unit names, VHDL standard revisions and HDL file type
//! classification.

#![warn(missing_docs)]

pub mod file_type;
pub mod hash;
pub mod name;
pub mod standard;

pub use file_type::{file_type_of, FileType, UnknownFileType};
pub use hash::{ContentHash, ContentHasher, ParseContentHashError};
pub use name::UnitName;
pub use standard::{ParseStandardError, VhdlStandard};
