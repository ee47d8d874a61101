//! HDL file type classification from file extensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The language of an HDL source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// VHDL (`.vhd`, `.vhdl`, `.vho`).
    Vhdl,
    /// Verilog (`.v`, `.vp`, `.vams`, `.vo`).
    Verilog,
    /// SystemVerilog (`.sv`).
    SystemVerilog,
}

impl FileType {
    /// Returns `true` for Verilog and SystemVerilog.
    pub fn is_any_verilog(self) -> bool {
        matches!(self, FileType::Verilog | FileType::SystemVerilog)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Vhdl => write!(f, "vhdl"),
            FileType::Verilog => write!(f, "verilog"),
            FileType::SystemVerilog => write!(f, "systemverilog"),
        }
    }
}

/// Error returned by [`file_type_of`] for an unrecognized extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file ending '{extension}' of {path}")]
pub struct UnknownFileType {
    /// The extension that was not recognized (with leading dot, may be empty).
    pub extension: String,
    /// The file the extension belongs to.
    pub path: String,
}

/// Classifies a file by its extension, ignoring case.
pub fn file_type_of(path: &Path) -> Result<FileType, UnknownFileType> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "vhd" | "vhdl" | "vho" => Ok(FileType::Vhdl),
        "v" | "vp" | "vams" | "vo" => Ok(FileType::Verilog),
        "sv" => Ok(FileType::SystemVerilog),
        _ => Err(UnknownFileType {
            extension: if ext.is_empty() {
                String::new()
            } else {
                format!(".{ext}")
            },
            path: path.display().to_string(),
        }),
    }
}
