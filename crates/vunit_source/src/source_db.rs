//! Central store of all source text scanned in a session.

use crate::source_text::{decode_latin1, SourceText};
use crate::span::{FileId, Span};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A span resolved to 1-indexed line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Path of the file.
    pub file_path: PathBuf,
    /// Start line (1-indexed).
    pub line: u32,
    /// Start column (1-indexed).
    pub col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path.display(), self.line, self.col)
    }
}

/// Owns the text of every scanned file.
///
/// Loading a path again replaces its text under the same [`FileId`], so
/// repeated scans of one file do not grow the database.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceText>,
    by_path: HashMap<PathBuf, FileId>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a file as raw bytes and stores its Latin-1 decoded text.
    ///
    /// Returns the [`FileId`] together with the raw bytes so the caller can
    /// hash exactly what is on disk.
    pub fn load_file(&mut self, path: &Path) -> Result<(FileId, Vec<u8>), io::Error> {
        let bytes = std::fs::read(path)?;
        let content = decode_latin1(&bytes);
        let id = match self.by_path.get(path) {
            Some(&id) => {
                self.files[id.as_raw() as usize] =
                    SourceText::new(id, path.to_path_buf(), content);
                id
            }
            None => {
                let id = self.add_source(path, content);
                self.by_path.insert(path.to_path_buf(), id);
                id
            }
        };
        Ok((id, bytes))
    }

    /// Stores in-memory text under `name`.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceText::new(id, name.into(), content));
        id
    }

    /// Returns the text for `id`, or `None` for [`FileId::DUMMY`] and unknown ids.
    pub fn get(&self, id: FileId) -> Option<&SourceText> {
        self.files.get(id.as_raw() as usize)
    }

    /// Resolves a span to a printable location.
    pub fn resolve_span(&self, span: Span) -> Option<ResolvedSpan> {
        let file = self.get(span.file)?;
        let (line, col) = file.line_col(span.start);
        Some(ResolvedSpan {
            file_path: file.path.clone(),
            line,
            col,
        })
    }

    /// Returns the text covered by `span`, or `""` if it does not resolve.
    pub fn snippet(&self, span: Span) -> &str {
        self.get(span.file)
            .and_then(|f| f.content.get(span.start as usize..span.end as usize))
            .unwrap_or("")
    }

    /// Number of loaded texts.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
