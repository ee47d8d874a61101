//! Persisted compile state for incremental builds.
//!
//! Each tracked source file owns one small hash file holding the content hash
//! recorded when the file was last compiled. The file's modification time
//! doubles as the compile timestamp, so a dependency compiled after one of
//! its dependents can be detected without any extra bookkeeping.

#![warn(missing_docs)]

pub mod error;
pub mod store;

pub use error::CacheError;
pub use store::{HashEntry, HashStore, HASH_FILE_EXT};
