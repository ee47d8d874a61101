//! Loaded source text with a line index.

use crate::span::FileId;
use std::path::PathBuf;

/// Text of one HDL file, as seen by the scanners.
pub struct SourceText {
    /// Identifier within the owning [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// Path the text was read from.
    pub path: PathBuf,
    /// Decoded text.
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceText {
    /// Creates a new text entry and indexes its line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let col = byte_offset - self.line_starts[line_idx] + 1;
        ((line_idx as u32) + 1, col)
    }

    /// Returns the full line containing `byte_offset`, without its newline.
    pub fn line_at(&self, byte_offset: u32) -> &str {
        let (line, _) = self.line_col(byte_offset);
        let start = self.line_starts[(line - 1) as usize] as usize;
        let rest = &self.content[start..];
        rest.split('\n').next().unwrap_or("").trim_end_matches('\r')
    }
}

/// Decodes ISO-8859-1 bytes, the encoding both VHDL and Verilog standardize on.
///
/// Every byte maps to the code point of the same value, so decoding never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(content: &str) -> SourceText {
        SourceText::new(FileId::from_raw(0), PathBuf::from("t.vhd"), content.to_string())
    }

    #[test]
    fn line_col_resolution() {
        let t = text("abc\ndef\nghi");
        assert_eq!(t.line_col(0), (1, 1));
        assert_eq!(t.line_col(5), (2, 2));
        assert_eq!(t.line_col(8), (3, 1));
    }

    #[test]
    fn line_at_strips_newline() {
        let t = text("entity e is\r\nend;\n");
        assert_eq!(t.line_at(3), "entity e is");
        assert_eq!(t.line_at(14), "end;");
    }

    #[test]
    fn latin1_decoding() {
        assert_eq!(decode_latin1(b"abc"), "abc");
        assert_eq!(decode_latin1(&[0x2d, 0x2d, 0xe5]), "--\u{e5}");
    }
}
