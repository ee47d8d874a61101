//! File identifiers and byte ranges within loaded source text.

use serde::{Deserialize, Serialize};

/// Opaque identifier for text loaded into the [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for diagnostics that are not tied to any text.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A byte range `[start, end)` within one loaded file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The text this span points into.
    pub file: FileId,
    /// Inclusive start offset.
    pub start: u32,
    /// Exclusive end offset.
    pub end: u32,
}

impl Span {
    /// A span that points nowhere; renderers print no location for it.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a span covering `start..end` of `file`.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Creates an empty span at the start of `file`.
    ///
    /// Used when a diagnostic concerns a file as a whole, e.g. a scan failure.
    pub fn file_start(file: FileId) -> Self {
        Self {
            file,
            start: 0,
            end: 0,
        }
    }

    /// Returns the smallest span that covers both `self` and `other`.
    ///
    /// Spans from different files are not merged; `self` is returned as is.
    pub fn to(self, other: Span) -> Span {
        if self.file != other.file {
            return self;
        }
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_covers_both() {
        let f = FileId::from_raw(0);
        let s = Span::new(f, 5, 8).to(Span::new(f, 12, 20));
        assert_eq!((s.start, s.end), (5, 20));
    }

    #[test]
    fn to_ignores_other_file() {
        let a = Span::new(FileId::from_raw(0), 1, 2);
        let b = Span::new(FileId::from_raw(1), 10, 20);
        assert_eq!(a.to(b), a);
    }

    #[test]
    fn dummy() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::file_start(FileId::from_raw(3)).is_dummy());
    }
}
