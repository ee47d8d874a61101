//! The [`Project`] façade: libraries, files, compile order and staleness.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use vunit_cache::{HashEntry, HashStore};
use vunit_common::{file_type_of, UnitName, VhdlStandard};
use vunit_diagnostics::DiagnosticSink;
use vunit_source::{normalize_path, SourceDb};

use crate::diagnostics;
use crate::error::ProjectError;
use crate::graph::{Cycle, DependencyGraph};
use crate::library::{Library, LibraryKind};
use crate::resolve::{Ambiguity, EdgePolicy, GraphBuilder};
use crate::source_file::{SourceFile, SourceFileId, SourceFileOptions};

/// Libraries registered by [`Project::new`] as simulator-provided.
pub const DEFAULT_BUILTIN_LIBRARIES: [&str; 2] = ["ieee", "std"];

/// Sub-directory of the output path that holds hash files.
const HASH_DIR: &str = "hashes";

/// Dependency policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Users of a package also wait for its body.
    pub depend_on_package_body: bool,
    /// VHDL component instantiations create edges in declaration-level
    /// dependency queries as well.
    pub depend_on_components: bool,
}

/// A set of libraries and source files with their dependency graph.
///
/// Files are identified by [`SourceFileId`], handed out in the order files are
/// first added. The graph is rebuilt from the current unit tables on every
/// order query.
pub struct Project {
    output_path: PathBuf,
    options: ProjectOptions,
    libraries: Vec<Library>,
    files: Vec<SourceFile>,
    file_index: HashMap<(UnitName, PathBuf), SourceFileId>,
    manual_dependencies: Vec<(SourceFileId, SourceFileId)>,
    hash_store: HashStore,
    source_db: SourceDb,
    sink: DiagnosticSink,
}

impl Project {
    /// Creates an empty project whose hash files live under `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self::with_options(output_path, ProjectOptions::default())
    }

    /// Creates an empty project with the given dependency policies.
    pub fn with_options(output_path: impl Into<PathBuf>, options: ProjectOptions) -> Self {
        let mut project = Self::without_builtins(output_path.into(), options);
        for name in DEFAULT_BUILTIN_LIBRARIES {
            project.libraries.push(Library::new(
                UnitName::new(name),
                PathBuf::new(),
                VhdlStandard::default(),
                LibraryKind::Builtin,
            ));
        }
        project
    }

    pub(crate) fn without_builtins(output_path: PathBuf, options: ProjectOptions) -> Self {
        Self {
            hash_store: HashStore::new(output_path.join(HASH_DIR)),
            output_path,
            options,
            libraries: Vec::new(),
            files: Vec::new(),
            file_index: HashMap::new(),
            manual_dependencies: Vec::new(),
            source_db: SourceDb::new(),
            sink: DiagnosticSink::new(),
        }
    }

    /// The directory hash files are written below.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Current dependency policies.
    pub fn options(&self) -> ProjectOptions {
        self.options
    }

    /// Makes users of a package depend on its body too.
    pub fn set_depend_on_package_body(&mut self, enabled: bool) {
        self.options.depend_on_package_body = enabled;
    }

    /// Adds component instantiation edges to declaration-level dependency
    /// queries.
    pub fn set_depend_on_components(&mut self, enabled: bool) {
        self.options.depend_on_components = enabled;
    }

    /// Adds a library compiled from project sources into `directory`.
    pub fn add_library(
        &mut self,
        name: &str,
        directory: impl Into<PathBuf>,
        vhdl_standard: VhdlStandard,
    ) -> Result<(), ProjectError> {
        self.insert_library(Library::new(
            UnitName::new(name),
            directory.into(),
            vhdl_standard,
            LibraryKind::Local,
        ))
    }

    /// Adds a pre-compiled library found at `path`.
    ///
    /// Units referenced in it but unknown to the project are not reported.
    pub fn add_external_library(
        &mut self,
        name: &str,
        path: impl Into<PathBuf>,
    ) -> Result<(), ProjectError> {
        let path: PathBuf = path.into();
        let path = normalize_path(&path);
        if !path.exists() {
            return Err(ProjectError::ExternalLibraryMissing { path });
        }
        if !path.is_dir() {
            return Err(ProjectError::ExternalLibraryNotDirectory { path });
        }
        self.insert_library(Library::new(
            UnitName::new(name),
            path,
            VhdlStandard::default(),
            LibraryKind::External,
        ))
    }

    /// Registers a simulator-provided library such as `ieee`.
    pub fn add_builtin_library(&mut self, name: &str) -> Result<(), ProjectError> {
        self.insert_library(Library::new(
            UnitName::new(name),
            PathBuf::new(),
            VhdlStandard::default(),
            LibraryKind::Builtin,
        ))
    }

    fn insert_library(&mut self, library: Library) -> Result<(), ProjectError> {
        if library.name().matches("work") {
            return Err(ProjectError::IllegalLibraryName {
                name: library.name().to_string(),
            });
        }
        match self.libraries.iter().position(|l| l.name() == library.name()) {
            // A builtin placeholder without files gives way to a real library.
            Some(idx)
                if self.libraries[idx].is_builtin()
                    && self.libraries[idx].source_files().is_empty()
                    && !library.is_builtin() =>
            {
                tracing::debug!(library = %library.name(), "replacing builtin library");
                self.libraries[idx] = library;
                Ok(())
            }
            Some(idx) => Err(ProjectError::DuplicateLibrary {
                name: library.name().to_string(),
                existing: self.libraries[idx].name().to_string(),
            }),
            None => {
                tracing::debug!(
                    library = %library.name(),
                    directory = %library.directory().display(),
                    kind = ?library.kind(),
                    "adding library"
                );
                self.libraries.push(library);
                Ok(())
            }
        }
    }

    fn library_index(&self, name: &str) -> Option<usize> {
        self.libraries.iter().position(|l| l.name().matches(name))
    }

    /// Reads, scans and adds `path` to `library`.
    ///
    /// Re-adding a file already in the library is a no-op when its content
    /// hash is unchanged and otherwise replaces it under the same id.
    pub fn add_source_file(
        &mut self,
        path: impl AsRef<Path>,
        library: &str,
        options: SourceFileOptions,
    ) -> Result<SourceFileId, ProjectError> {
        let path = normalize_path(path.as_ref());
        let lib_idx = self
            .library_index(library)
            .ok_or_else(|| ProjectError::UnknownLibrary(library.to_string()))?;
        let file_type = match options.file_type {
            Some(file_type) => file_type,
            None => file_type_of(&path)?,
        };
        let vhdl_standard = options
            .vhdl_standard
            .unwrap_or_else(|| self.libraries[lib_idx].vhdl_standard());
        let lib_name = self.libraries[lib_idx].name().clone();
        let key = (lib_name.clone(), path.clone());
        let existing = self.file_index.get(&key).copied();
        let id = existing.unwrap_or_else(|| SourceFileId::from_raw(self.files.len() as u32));

        let file = SourceFile::scan(
            id,
            &path,
            lib_name.clone(),
            file_type,
            vhdl_standard,
            &options,
            &mut self.source_db,
            &self.sink,
        )?;

        let library = &mut self.libraries[lib_idx];
        library.check_design_units(&file, &self.files)?;
        match existing {
            Some(id) => {
                if self.files[id.index()].content_hash() == file.content_hash() {
                    self.sink.emit(diagnostics::identical_file_readded(
                        &path,
                        lib_name.as_str(),
                    ));
                    return Ok(id);
                }
                self.sink
                    .emit(diagnostics::file_replaced(&path, lib_name.as_str()));
                library.remove_design_units_of(id);
                self.files[id.index()] = file;
            }
            None => {
                self.files.push(file);
                self.file_index.insert(key, id);
                library.push_source_file(id);
            }
        }
        library.insert_design_units(&self.files[id.index()], &self.files, &self.sink);
        Ok(id)
    }

    /// Forces `file` to be compiled after `depends_on`.
    pub fn add_manual_dependency(
        &mut self,
        file: SourceFileId,
        depends_on: SourceFileId,
    ) -> Result<(), ProjectError> {
        self.checked_file(file)?;
        self.checked_file(depends_on)?;
        if !self.manual_dependencies.contains(&(file, depends_on)) {
            self.manual_dependencies.push((file, depends_on));
        }
        Ok(())
    }

    fn checked_file(&self, id: SourceFileId) -> Result<&SourceFile, ProjectError> {
        self.files
            .get(id.index())
            .ok_or_else(|| ProjectError::UnknownSourceFile(id.to_string()))
    }

    /// Builds the dependency graph from the current unit tables.
    ///
    /// With `implementation` set, entity instantiations are bound to an
    /// architecture and component instantiations create edges. Architectures
    /// that cannot be chosen are reported as warnings.
    pub fn create_dependency_graph(
        &self,
        implementation: bool,
    ) -> Result<DependencyGraph, ProjectError> {
        let (graph, ambiguities) = self.build_graph(self.dependency_policy(implementation));
        for ambiguity in &ambiguities {
            ambiguity.warn(&self.sink);
        }
        Ok(graph)
    }

    /// Edges for dependency queries at the given level.
    fn dependency_policy(&self, implementation: bool) -> EdgePolicy {
        EdgePolicy {
            depend_on_package_body: self.options.depend_on_package_body,
            components: implementation || self.options.depend_on_components,
            implementation,
        }
    }

    /// Edges for the project compile order: declaration level plus every
    /// component instantiation.
    fn compile_order_policy(&self) -> EdgePolicy {
        EdgePolicy {
            components: true,
            ..self.dependency_policy(false)
        }
    }

    fn build_graph(&self, policy: EdgePolicy) -> (DependencyGraph, Vec<Ambiguity>) {
        GraphBuilder::new(&self.libraries, &self.files, &self.sink, policy)
            .build(&self.manual_dependencies)
    }

    /// The graph and its full topological order, failing on ambiguity or cycles.
    fn ordered_graph(
        &self,
        policy: EdgePolicy,
    ) -> Result<(DependencyGraph, Vec<SourceFileId>), ProjectError> {
        let (graph, ambiguities) = self.build_graph(policy);
        if let Some(ambiguity) = ambiguities.into_iter().next() {
            return Err(ambiguity.into_error());
        }
        let order = graph.toposort().map_err(|cycle| self.cycle_error(cycle))?;
        Ok((graph, order))
    }

    fn cycle_error(&self, cycle: Cycle) -> ProjectError {
        ProjectError::CircularDependency {
            chain: cycle
                .chain
                .iter()
                .map(|&id| {
                    self.files
                        .get(id.index())
                        .map_or_else(|| PathBuf::from(id.to_string()), |f| f.path().to_path_buf())
                })
                .collect(),
        }
    }

    /// Every file in compile order, or with `incremental` only the files that
    /// need recompiling. Component instantiations order files regardless of
    /// [`ProjectOptions::depend_on_components`].
    pub fn get_files_in_compile_order(
        &self,
        incremental: bool,
    ) -> Result<Vec<SourceFileId>, ProjectError> {
        let (graph, order) = self.ordered_graph(self.compile_order_policy())?;
        if !incremental {
            return Ok(order);
        }
        let stale = self.stale_files(&graph)?;
        Ok(order.into_iter().filter(|id| stale.contains(id)).collect())
    }

    /// `targets` and everything they depend on, in compile order. Without
    /// targets the whole project is returned.
    pub fn get_dependencies_in_compile_order(
        &self,
        targets: Option<&[SourceFileId]>,
        implementation: bool,
    ) -> Result<Vec<SourceFileId>, ProjectError> {
        let (graph, order) = self.ordered_graph(self.dependency_policy(implementation))?;
        match targets {
            None => Ok(order),
            Some(targets) => {
                let needed = self.closure(&graph, targets)?;
                Ok(order.into_iter().filter(|id| needed.contains(id)).collect())
            }
        }
    }

    /// Like [`get_dependencies_in_compile_order`](Self::get_dependencies_in_compile_order)
    /// but limited to the files that need recompiling.
    pub fn get_minimal_file_set_in_compile_order(
        &self,
        targets: Option<&[SourceFileId]>,
    ) -> Result<Vec<SourceFileId>, ProjectError> {
        let (graph, order) = self.ordered_graph(self.compile_order_policy())?;
        let stale = self.stale_files(&graph)?;
        let needed = match targets {
            None => None,
            Some(targets) => Some(self.closure(&graph, targets)?),
        };
        Ok(order
            .into_iter()
            .filter(|id| stale.contains(id))
            .filter(|id| needed.as_ref().map_or(true, |n| n.contains(id)))
            .collect())
    }

    fn closure(
        &self,
        graph: &DependencyGraph,
        targets: &[SourceFileId],
    ) -> Result<HashSet<SourceFileId>, ProjectError> {
        for &id in targets {
            self.checked_file(id)?;
        }
        let mut needed = graph.get_dependencies(targets);
        needed.extend(targets.iter().copied());
        Ok(needed)
    }

    /// Files that need recompiling: those whose recorded hash is missing or
    /// differs, or that have a dependency recorded more recently, plus every
    /// file depending on one of those.
    fn stale_files(&self, graph: &DependencyGraph) -> Result<HashSet<SourceFileId>, ProjectError> {
        let mut entries: HashMap<SourceFileId, Option<HashEntry>> = HashMap::new();
        for file in &self.files {
            let entry = self.hash_store.entry(file.library().as_str(), file.path())?;
            entries.insert(file.id(), entry);
        }

        let mut seeds = Vec::new();
        for file in &self.files {
            if self.needs_recompile(graph, file, &entries) {
                seeds.push(file.id());
            }
        }
        let mut stale = graph.get_dependents(&seeds);
        stale.extend(seeds);
        Ok(stale)
    }

    fn needs_recompile(
        &self,
        graph: &DependencyGraph,
        file: &SourceFile,
        entries: &HashMap<SourceFileId, Option<HashEntry>>,
    ) -> bool {
        let Some(Some(entry)) = entries.get(&file.id()) else {
            tracing::debug!(path = %file.path().display(), "no hash file, must be recompiled");
            return true;
        };
        if entry.hash != Some(file.content_hash()) {
            tracing::debug!(path = %file.path().display(), "hash changed, must be recompiled");
            return true;
        }
        let newer_dependency = graph.get_dependencies(&[file.id()]).into_iter().any(|dep| {
            matches!(entries.get(&dep), Some(Some(other)) if other.modified > entry.modified)
        });
        if newer_dependency {
            tracing::debug!(
                path = %file.path().display(),
                "dependency compiled more recently, must be recompiled"
            );
            return true;
        }
        false
    }

    /// Records the current content hash of `id` as compiled.
    ///
    /// Call only after the file was compiled successfully.
    pub fn update(&self, id: SourceFileId) -> Result<(), ProjectError> {
        let file = self.checked_file(id)?;
        let hash = file.content_hash();
        self.hash_store
            .write(file.library().as_str(), file.path(), hash)?;
        tracing::debug!(path = %file.path().display(), %hash, "recorded content hash");
        Ok(())
    }

    /// Location of the hash file recorded for `id`.
    pub fn hash_file_path(&self, id: SourceFileId) -> Result<PathBuf, ProjectError> {
        let file = self.checked_file(id)?;
        Ok(self
            .hash_store
            .hash_file_path(file.library().as_str(), file.path()))
    }

    /// All files in the order they were first added.
    pub fn get_source_files_in_order(&self) -> &[SourceFile] {
        &self.files
    }

    /// Looks up a file by id.
    pub fn source_file(&self, id: SourceFileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Mutable access, e.g. to change compile options.
    pub fn source_file_mut(&mut self, id: SourceFileId) -> Option<&mut SourceFile> {
        self.files.get_mut(id.index())
    }

    /// Looks up a file by path within `library`.
    pub fn get_source_file(&self, path: impl AsRef<Path>, library: &str) -> Option<&SourceFile> {
        let key = (UnitName::new(library), normalize_path(path.as_ref()));
        self.file_index.get(&key).and_then(|&id| self.source_file(id))
    }

    /// Paths of `ids`, for display.
    pub fn paths_of(&self, ids: &[SourceFileId]) -> Vec<PathBuf> {
        ids.iter()
            .filter_map(|&id| self.source_file(id))
            .map(|f| f.path().to_path_buf())
            .collect()
    }

    /// All libraries, builtins first.
    pub fn get_libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Looks up a library ignoring case.
    pub fn get_library(&self, name: &str) -> Option<&Library> {
        self.library_index(name).map(|idx| &self.libraries[idx])
    }

    /// Returns `true` if a library of that name, ignoring case, exists.
    pub fn has_library(&self, name: &str) -> bool {
        self.library_index(name).is_some()
    }

    /// Warnings and notes reported so far.
    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Loaded source text, for rendering diagnostics.
    pub fn source_db(&self) -> &SourceDb {
        &self.source_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use vunit_diagnostics::Severity;

    struct Fixture {
        dir: tempfile::TempDir,
        project: Project,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut project = Project::new(dir.path().join("out"));
            project
                .add_library("lib", dir.path().join("lib"), VhdlStandard::default())
                .unwrap();
            Self { dir, project }
        }

        fn add(&mut self, name: &str, text: &str) -> SourceFileId {
            let path = self.dir.path().join(name);
            fs::write(&path, text).unwrap();
            self.project
                .add_source_file(&path, "lib", SourceFileOptions::default())
                .unwrap()
        }
    }

    #[test]
    fn builtins_are_registered() {
        let project = Project::new("out");
        assert!(project.has_library("IEEE"));
        assert!(project.get_library("std").unwrap().is_builtin());
    }

    #[test]
    fn work_is_not_a_library_name() {
        let mut project = Project::new("out");
        let err = project
            .add_library("Work", "lib", VhdlStandard::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::IllegalLibraryName { .. }));
    }

    #[test]
    fn duplicate_library_ignores_case() {
        let mut project = Project::new("out");
        project
            .add_library("Lib", "a", VhdlStandard::default())
            .unwrap();
        let err = project
            .add_library("LIB", "b", VhdlStandard::default())
            .unwrap_err();
        match err {
            ProjectError::DuplicateLibrary { name, existing } => {
                assert_eq!(name, "LIB");
                assert_eq!(existing, "Lib");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn builtin_can_be_replaced_by_local_library() {
        let mut project = Project::new("out");
        project
            .add_library("ieee", "ieee", VhdlStandard::default())
            .unwrap();
        assert_eq!(project.get_library("ieee").unwrap().kind(), LibraryKind::Local);
        assert_eq!(
            project
                .get_libraries()
                .iter()
                .filter(|l| l.name().matches("ieee"))
                .count(),
            1
        );
    }

    #[test]
    fn external_library_must_be_an_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = Project::new(dir.path().join("out"));
        let missing = project
            .add_external_library("ext", dir.path().join("missing"))
            .unwrap_err();
        assert!(missing.to_string().contains("does not exist"));

        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        let not_dir = project.add_external_library("ext", &file).unwrap_err();
        assert!(matches!(not_dir, ProjectError::ExternalLibraryNotDirectory { .. }));

        project.add_external_library("ext", dir.path()).unwrap();
        assert!(project.get_library("EXT").unwrap().is_external());
    }

    #[test]
    fn unknown_library_and_file_type() {
        let mut f = Fixture::new();
        let path = f.dir.path().join("a.vhd");
        fs::write(&path, "").unwrap();
        let err = f
            .project
            .add_source_file(&path, "nolib", SourceFileOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::UnknownLibrary(_)));

        let txt = f.dir.path().join("a.txt");
        fs::write(&txt, "").unwrap();
        let err = f
            .project
            .add_source_file(&txt, "lib", SourceFileOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::UnknownFileType(_)));
    }

    #[test]
    fn readding_identical_file_keeps_id() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package pkg is end package;");
        let again = f.add("a.vhd", "package pkg is end package;");
        assert_eq!(a, again);
        assert_eq!(f.project.get_source_files_in_order().len(), 1);
        let notes = f.project.diagnostics().messages(Severity::Note);
        assert_eq!(notes.len(), 1);

        for _ in 0..3 {
            f.add("a.vhd", "package pkg is end package;");
        }
        assert_eq!(f.project.source_db().len(), 1);
    }

    #[test]
    fn readding_changed_file_replaces_units() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package pkg is end package;");
        let again = f.add("a.vhd", "package other is end package;");
        assert_eq!(a, again);
        let lib = f.project.get_library("lib").unwrap();
        assert!(lib.primary_unit("pkg").is_none());
        assert!(lib.primary_unit("other").is_some());
    }

    #[test]
    fn primary_unit_in_two_files_is_rejected() {
        let mut f = Fixture::new();
        f.add("a.vhd", "entity ent is end entity;");
        let path = f.dir.path().join("b.vhd");
        fs::write(&path, "entity ENT is end entity;").unwrap();
        let err = f
            .project
            .add_source_file(&path, "lib", SourceFileOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::DuplicateDesignUnit { .. }));
        assert_eq!(f.project.get_source_files_in_order().len(), 1);
    }

    #[test]
    fn manual_dependency_orders_files() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package a is end package;");
        let b = f.add("b.vhd", "package b is end package;");
        f.project.add_manual_dependency(a, b).unwrap();
        let order = f.project.get_files_in_compile_order(false).unwrap();
        assert_eq!(order, vec![b, a]);
        assert!(f
            .project
            .add_manual_dependency(a, SourceFileId::from_raw(9))
            .is_err());
    }

    #[test]
    fn update_writes_hash_file() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package a is end package;");
        let path = f.project.hash_file_path(a).unwrap();
        assert!(path.starts_with(f.dir.path().join("out").join(HASH_DIR)));
        assert!(!path.exists());
        f.project.update(a).unwrap();
        assert!(path.exists());
        assert!(f.project.get_files_in_compile_order(true).unwrap().is_empty());
    }

    #[test]
    fn compile_option_change_makes_file_stale() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package a is end package;");
        f.project.update(a).unwrap();
        f.project
            .source_file_mut(a)
            .unwrap()
            .set_compile_option("ghdl.flags", vec!["--relaxed".to_string()])
            .unwrap();
        assert_eq!(f.project.get_files_in_compile_order(true).unwrap(), vec![a]);
    }

    #[test]
    fn get_source_file_by_path() {
        let mut f = Fixture::new();
        let a = f.add("a.vhd", "package a is end package;");
        let path = f.dir.path().join("a.vhd");
        assert_eq!(f.project.get_source_file(&path, "LIB").unwrap().id(), a);
        assert!(f.project.get_source_file(&path, "other").is_none());
        assert_eq!(f.project.paths_of(&[a]), vec![normalize_path(&path)]);
    }
}
