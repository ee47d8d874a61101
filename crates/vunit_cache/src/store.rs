//! One hash file per (library, source path).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use vunit_common::{ContentHash, ContentHasher};

use crate::error::CacheError;

/// Extension of every hash file written by [`HashStore`].
pub const HASH_FILE_EXT: &str = "vunit_hash";

/// What is on disk for one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEntry {
    /// The recorded hash, or `None` if the file content is not a valid hash.
    pub hash: Option<ContentHash>,
    /// When the hash file was last written.
    pub modified: SystemTime,
}

/// Directory of hash files, one per tracked source file.
///
/// File names are derived from a hash of the library name (case-folded) and
/// the source path, so the same source compiled into two libraries gets two
/// independent entries.
#[derive(Debug, Clone)]
pub struct HashStore {
    directory: PathBuf,
}

impl HashStore {
    /// Creates a store rooted at `directory`. Nothing is created on disk
    /// until the first [`write`](Self::write).
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of the hash file for `source` in `library`.
    ///
    /// `source` should already be normalized; two spellings of the same path
    /// map to different entries.
    pub fn hash_file_path(&self, library: &str, source: &Path) -> PathBuf {
        let key = ContentHasher::new()
            .str_field(&library.to_lowercase())
            .str_field(&source.to_string_lossy())
            .finish();
        self.directory.join(format!("{key}.{HASH_FILE_EXT}"))
    }

    /// Reads the entry for `source`, returning `None` if it was never written.
    pub fn entry(&self, library: &str, source: &Path) -> Result<Option<HashEntry>, CacheError> {
        let path = self.hash_file_path(library, source);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };
        let modified = metadata.modified().map_err(|e| CacheError::io(&path, e))?;
        let content = std::fs::read_to_string(&path).map_err(|e| CacheError::io(&path, e))?;
        let hash = content.trim().parse::<ContentHash>().ok();
        if hash.is_none() {
            tracing::debug!(path = %path.display(), "ignoring malformed hash file");
        }
        Ok(Some(HashEntry { hash, modified }))
    }

    /// Records `hash` for `source`, creating the store directory if needed.
    ///
    /// The write always touches the file, so the entry's timestamp moves
    /// forward even when the hash is unchanged.
    pub fn write(&self, library: &str, source: &Path, hash: ContentHash) -> Result<(), CacheError> {
        if self.directory.exists() && !self.directory.is_dir() {
            return Err(CacheError::NotADirectory {
                path: self.directory.clone(),
            });
        }
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| CacheError::io(&self.directory, e))?;
        let path = self.hash_file_path(library, source);
        std::fs::write(&path, hash.to_string()).map_err(|e| CacheError::io(&path, e))?;
        tracing::debug!(source = %source.display(), %hash, "wrote hash file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn store() -> (tempfile::TempDir, HashStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HashStore::new(dir.path().join("hashes"));
        (dir, store)
    }

    #[test]
    fn missing_entry_reads_as_none() {
        let (_dir, store) = store();
        let source = Path::new("/src/top.vhd");
        assert!(store.entry("lib", source).unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let (_dir, store) = store();
        let source = Path::new("/src/top.vhd");
        let hash = ContentHash::from_bytes(b"entity top is end;");
        store.write("lib", source, hash).unwrap();
        let entry = store.entry("lib", source).unwrap().unwrap();
        assert_eq!(entry.hash, Some(hash));
        assert!(store.hash_file_path("lib", source).exists());
    }

    #[test]
    fn library_name_is_case_insensitive() {
        let (_dir, store) = store();
        let source = Path::new("/src/top.vhd");
        assert_eq!(
            store.hash_file_path("Lib", source),
            store.hash_file_path("lib", source)
        );
        assert_ne!(
            store.hash_file_path("lib", source),
            store.hash_file_path("other", source)
        );
    }

    #[test]
    fn malformed_content_has_no_hash() {
        let (_dir, store) = store();
        let source = Path::new("/src/top.vhd");
        store
            .write("lib", source, ContentHash::from_bytes(b"x"))
            .unwrap();
        std::fs::write(store.hash_file_path("lib", source), "garbage").unwrap();
        let entry = store.entry("lib", source).unwrap().unwrap();
        assert_eq!(entry.hash, None);
    }

    #[test]
    fn rewrite_advances_timestamp() {
        let (_dir, store) = store();
        let source = Path::new("/src/top.vhd");
        let hash = ContentHash::from_bytes(b"x");
        store.write("lib", source, hash).unwrap();

        let path = store.hash_file_path("lib", source);
        let past = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(past)
            .unwrap();
        let before = store.entry("lib", source).unwrap().unwrap().modified;

        store.write("lib", source, hash).unwrap();
        let after = store.entry("lib", source).unwrap().unwrap().modified;
        assert!(after > before);
    }

    #[test]
    fn write_into_file_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("hashes");
        std::fs::write(&blocker, "").unwrap();
        let store = HashStore::new(&blocker);
        let err = store
            .write("lib", Path::new("a.vhd"), ContentHash::from_bytes(b"x"))
            .unwrap_err();
        assert!(matches!(err, CacheError::NotADirectory { .. }));
    }
}
