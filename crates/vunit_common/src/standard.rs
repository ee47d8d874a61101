//! VHDL language standard revisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A VHDL language revision.
///
/// Ordered by publication year. The standard in effect for a file is part of
/// its content hash since it changes how the file is analyzed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VhdlStandard {
    /// IEEE 1076-1993.
    Vhdl1993,
    /// IEEE 1076-2002.
    Vhdl2002,
    /// IEEE 1076-2008.
    #[default]
    Vhdl2008,
    /// IEEE 1076-2019.
    Vhdl2019,
}

impl VhdlStandard {
    /// All known revisions in ascending order.
    pub const ALL: [VhdlStandard; 4] = [
        VhdlStandard::Vhdl1993,
        VhdlStandard::Vhdl2002,
        VhdlStandard::Vhdl2008,
        VhdlStandard::Vhdl2019,
    ];

    /// Returns the four digit year of this revision.
    pub fn year(self) -> &'static str {
        match self {
            VhdlStandard::Vhdl1993 => "1993",
            VhdlStandard::Vhdl2002 => "2002",
            VhdlStandard::Vhdl2008 => "2008",
            VhdlStandard::Vhdl2019 => "2019",
        }
    }

    /// Returns `true` if context declarations are part of this revision.
    pub fn supports_context(self) -> bool {
        self >= VhdlStandard::Vhdl2008
    }
}

impl fmt::Display for VhdlStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Simulators historically take "93" rather than "1993".
            VhdlStandard::Vhdl1993 => f.write_str("93"),
            other => f.write_str(other.year()),
        }
    }
}

/// Error returned for an unrecognized VHDL standard string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown VHDL standard '{0}'")]
pub struct ParseStandardError(pub String);

impl FromStr for VhdlStandard {
    type Err = ParseStandardError;

    /// Accepts either the full year (`"2008"`) or its last two digits (`"08"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        VhdlStandard::ALL
            .into_iter()
            .find(|std| std.year() == s || (s.len() == 2 && std.year().ends_with(s)))
            .ok_or_else(|| ParseStandardError(s.to_string()))
    }
}

impl TryFrom<String> for VhdlStandard {
    type Error = ParseStandardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<VhdlStandard> for String {
    fn from(std: VhdlStandard) -> Self {
        std.year().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_and_short() {
        assert_eq!("2008".parse::<VhdlStandard>().unwrap(), VhdlStandard::Vhdl2008);
        assert_eq!("08".parse::<VhdlStandard>().unwrap(), VhdlStandard::Vhdl2008);
        assert_eq!("93".parse::<VhdlStandard>().unwrap(), VhdlStandard::Vhdl1993);
        assert_eq!("2019".parse::<VhdlStandard>().unwrap(), VhdlStandard::Vhdl2019);
    }

    #[test]
    fn parse_unknown() {
        let err = "1987".parse::<VhdlStandard>().unwrap_err();
        assert_eq!(err.to_string(), "unknown VHDL standard '1987'");
        assert!("8".parse::<VhdlStandard>().is_err());
    }

    #[test]
    fn ordering_and_context() {
        assert!(VhdlStandard::Vhdl1993 < VhdlStandard::Vhdl2008);
        assert!(!VhdlStandard::Vhdl2002.supports_context());
        assert!(VhdlStandard::Vhdl2019.supports_context());
    }

    #[test]
    fn display_legacy_93() {
        assert_eq!(VhdlStandard::Vhdl1993.to_string(), "93");
        assert_eq!(VhdlStandard::Vhdl2008.to_string(), "2008");
    }

    #[test]
    fn default_is_2008() {
        assert_eq!(VhdlStandard::default(), VhdlStandard::Vhdl2008);
    }
}
