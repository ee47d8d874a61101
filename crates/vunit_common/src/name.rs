//! Case-insensitive names for libraries and design units.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A library or design-unit name that compares case-insensitively.
///
/// The spelling of the first declaration is kept for display; equality,
/// hashing and ordering use the lowercase form. Lookups in maps keyed by
/// `UnitName` can borrow the lowercase key as a `str`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UnitName {
    original: String,
    key: String,
}

impl UnitName {
    /// Creates a name, keeping `name` as the display spelling.
    pub fn new(name: impl Into<String>) -> Self {
        let original = name.into();
        let key = original.to_ascii_lowercase();
        Self { original, key }
    }

    /// Returns the name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Returns the lowercase comparison key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if `other` names the same thing, ignoring case.
    pub fn matches(&self, other: &str) -> bool {
        self.key.eq_ignore_ascii_case(other)
    }
}

impl PartialEq for UnitName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for UnitName {}

impl Hash for UnitName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for UnitName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UnitName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Debug for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitName({:?})", self.original)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<UnitName> for String {
    fn from(name: UnitName) -> Self {
        name.original
    }
}
