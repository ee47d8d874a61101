//! Shared fixture for on-disk project tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use vunit_common::VhdlStandard;
use vunit_diagnostics::Severity;
use vunit_project::{Project, ProjectOptions, SourceFileId, SourceFileOptions};

/// A project in a temporary directory with one local library, `lib`.
pub struct TestProject {
    pub dir: TempDir,
    pub project: Project,
}

impl TestProject {
    pub fn new() -> Self {
        Self::with_options(ProjectOptions::default())
    }

    pub fn with_options(options: ProjectOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let project = Project::with_options(dir.path().join("out"), options);
        let mut test = Self { dir, project };
        test.add_library("lib");
        test
    }

    pub fn add_library(&mut self, name: &str) {
        let directory = self.dir.path().join("out").join(name);
        self.project
            .add_library(name, directory, VhdlStandard::default())
            .unwrap();
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes `text` to `name` and adds it to `library`.
    pub fn add(&mut self, library: &str, name: &str, text: &str) -> SourceFileId {
        self.add_with(library, name, text, SourceFileOptions::default())
    }

    pub fn add_with(
        &mut self,
        library: &str,
        name: &str,
        text: &str,
        options: SourceFileOptions,
    ) -> SourceFileId {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        self.project.add_source_file(&path, library, options).unwrap()
    }

    /// File names of `ids`, in the given order.
    pub fn names(&self, ids: &[SourceFileId]) -> Vec<String> {
        self.project
            .paths_of(ids)
            .iter()
            .map(|p| file_name(p))
            .collect()
    }

    pub fn compile_order(&self) -> Vec<String> {
        self.names(&self.project.get_files_in_compile_order(false).unwrap())
    }

    pub fn stale(&self) -> Vec<String> {
        self.names(&self.project.get_files_in_compile_order(true).unwrap())
    }

    /// Marks `ids` compiled, one second apart, ending one second ago.
    pub fn update_in_order(&self, ids: &[SourceFileId]) {
        let now = SystemTime::now();
        for (idx, &id) in ids.iter().enumerate() {
            self.project.update(id).unwrap();
            let age = Duration::from_secs((ids.len() - idx) as u64);
            let hash_file = self.project.hash_file_path(id).unwrap();
            fs::File::options()
                .write(true)
                .open(hash_file)
                .unwrap()
                .set_modified(now - age)
                .unwrap();
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.project.diagnostics().messages(Severity::Warning)
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

/// Index of `name` in `order`; panics if absent.
pub fn position(order: &[String], name: &str) -> usize {
    order
        .iter()
        .position(|n| n == name)
        .unwrap_or_else(|| panic!("{name} not in {order:?}"))
}
