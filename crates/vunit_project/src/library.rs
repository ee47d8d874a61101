//! Libraries and their design-unit tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vunit_common::{UnitName, VhdlStandard};
use vunit_diagnostics::DiagnosticSink;

use crate::design_unit::{DesignUnit, UnitKind};
use crate::diagnostics;
use crate::error::ProjectError;
use crate::source_file::{SourceFile, SourceFileId};

/// Where a library's contents come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LibraryKind {
    /// Compiled from the project's own source files.
    Local,
    /// Pre-compiled at a directory outside the project.
    External,
    /// Provided by the simulator, such as `ieee` and `std`.
    Builtin,
}

/// A named collection of source files and the units they declare.
///
/// Primary units share one case-insensitive namespace. Architectures and
/// package bodies are kept per primary unit; duplicates are retained and the
/// most recently added one wins when binding.
#[derive(Debug, Clone)]
pub struct Library {
    name: UnitName,
    directory: PathBuf,
    vhdl_standard: VhdlStandard,
    kind: LibraryKind,
    source_files: Vec<SourceFileId>,
    primary_units: BTreeMap<UnitName, DesignUnit>,
    architectures: BTreeMap<UnitName, Vec<DesignUnit>>,
    package_bodies: BTreeMap<UnitName, Vec<DesignUnit>>,
}

impl Library {
    pub(crate) fn new(
        name: UnitName,
        directory: PathBuf,
        vhdl_standard: VhdlStandard,
        kind: LibraryKind,
    ) -> Self {
        Self {
            name,
            directory,
            vhdl_standard,
            kind,
            source_files: Vec::new(),
            primary_units: BTreeMap::new(),
            architectures: BTreeMap::new(),
            package_bodies: BTreeMap::new(),
        }
    }

    /// Logical name as first added.
    pub fn name(&self) -> &UnitName {
        &self.name
    }

    /// Compiled library location.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Default standard for VHDL files added without one.
    pub fn vhdl_standard(&self) -> VhdlStandard {
        self.vhdl_standard
    }

    /// Where the library's contents come from.
    pub fn kind(&self) -> LibraryKind {
        self.kind
    }

    /// `true` for libraries whose contents the project does not track.
    pub fn is_external(&self) -> bool {
        self.kind != LibraryKind::Local
    }

    /// `true` for simulator-provided libraries.
    pub fn is_builtin(&self) -> bool {
        self.kind == LibraryKind::Builtin
    }

    /// Files in insertion order.
    pub fn source_files(&self) -> &[SourceFileId] {
        &self.source_files
    }

    /// Looks up a primary unit, ignoring case.
    pub fn primary_unit(&self, name: &str) -> Option<&DesignUnit> {
        self.primary_units.get(name.to_ascii_lowercase().as_str())
    }

    /// All entities, ordered by lowercase name.
    pub fn get_entities(&self) -> impl Iterator<Item = &DesignUnit> {
        self.primary_units_of_kind(UnitKind::Entity)
    }

    /// All Verilog modules, ordered by lowercase name.
    pub fn get_modules(&self) -> impl Iterator<Item = &DesignUnit> {
        self.primary_units_of_kind(UnitKind::Module)
    }

    /// All packages, ordered by lowercase name.
    pub fn get_packages(&self) -> impl Iterator<Item = &DesignUnit> {
        self.primary_units_of_kind(UnitKind::Package)
    }

    fn primary_units_of_kind(&self, kind: UnitKind) -> impl Iterator<Item = &DesignUnit> {
        self.primary_units.values().filter(move |u| u.kind == kind)
    }

    /// The most recently added body of `package`.
    pub fn get_package_body(&self, package: &str) -> Option<&DesignUnit> {
        self.package_bodies
            .get(package.to_ascii_lowercase().as_str())
            .and_then(|bodies| bodies.last())
    }

    /// Every architecture of `entity` in insertion order, duplicates included.
    pub fn architectures_of(&self, entity: &str) -> &[DesignUnit] {
        self.architectures
            .get(entity.to_ascii_lowercase().as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct architecture names of `entity` in first-declaration order.
    pub fn architecture_names(&self, entity: &str) -> Vec<&UnitName> {
        let mut names: Vec<&UnitName> = Vec::new();
        for arch in self.architectures_of(entity) {
            if !names.contains(&&arch.name) {
                names.push(&arch.name);
            }
        }
        names
    }

    /// The most recently added architecture `architecture` of `entity`.
    pub fn architecture(&self, entity: &str, architecture: &str) -> Option<&DesignUnit> {
        self.architectures_of(entity)
            .iter()
            .rev()
            .find(|a| a.name.matches(architecture))
    }

    /// Configurations declared for `entity`.
    pub fn configurations_of<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a DesignUnit> {
        self.primary_units_of_kind(UnitKind::Configuration)
            .filter(move |c| c.primary.as_ref().is_some_and(|p| p.matches(entity)))
    }

    pub(crate) fn push_source_file(&mut self, id: SourceFileId) {
        if !self.source_files.contains(&id) {
            self.source_files.push(id);
        }
    }

    /// Fails if `file` declares a primary unit another file already declares.
    pub(crate) fn check_design_units(
        &self,
        file: &SourceFile,
        files: &[SourceFile],
    ) -> Result<(), ProjectError> {
        for unit in file.design_units().iter().filter(|u| u.is_primary()) {
            let Some(existing) = self.primary_units.get(&unit.name) else {
                continue;
            };
            if existing.source_file == file.id() {
                continue;
            }
            let first = files
                .get(existing.source_file.index())
                .map_or_else(PathBuf::new, |f| f.path().to_path_buf());
            return Err(ProjectError::DuplicateDesignUnit {
                kind: unit.kind,
                name: existing.name.to_string(),
                library: self.name.to_string(),
                first,
                second: file.path().to_path_buf(),
            });
        }
        Ok(())
    }

    /// Adds the units of `file`; call [`check_design_units`](Self::check_design_units) first.
    pub(crate) fn insert_design_units(
        &mut self,
        file: &SourceFile,
        files: &[SourceFile],
        sink: &DiagnosticSink,
    ) {
        let path_of = |id: SourceFileId| {
            if id == file.id() {
                file.path().to_path_buf()
            } else {
                files
                    .get(id.index())
                    .map_or_else(PathBuf::new, |f| f.path().to_path_buf())
            }
        };

        for unit in file.design_units() {
            if unit.is_primary() {
                if let Some(existing) = self.primary_units.get(&unit.name) {
                    sink.emit(diagnostics::duplicate_in_same_file(
                        &unit.description(),
                        &path_of(existing.source_file),
                        unit.span,
                    ));
                    continue;
                }
                self.primary_units.insert(unit.name.clone(), unit.clone());
                continue;
            }

            let Some(primary) = unit.primary.clone() else {
                continue;
            };
            let table = match unit.kind {
                UnitKind::PackageBody => &mut self.package_bodies,
                _ => &mut self.architectures,
            };
            let entries = table.entry(primary).or_default();
            if let Some(previous) = entries.iter().rev().find(|u| u.name == unit.name) {
                let previous = path_of(previous.source_file);
                if previous.as_path() == file.path() {
                    sink.emit(diagnostics::duplicate_in_same_file(
                        &unit.description(),
                        &previous,
                        unit.span,
                    ));
                } else {
                    sink.emit(diagnostics::duplicate_secondary_unit(
                        &unit.description(),
                        &previous,
                        unit.span,
                    ));
                }
            }
            entries.push(unit.clone());
        }
    }

    /// Drops every unit declared by `file`.
    pub(crate) fn remove_design_units_of(&mut self, file: SourceFileId) {
        self.primary_units.retain(|_, u| u.source_file != file);
        for table in [&mut self.architectures, &mut self.package_bodies] {
            for entries in table.values_mut() {
                entries.retain(|u| u.source_file != file);
            }
            table.retain(|_, entries| !entries.is_empty());
        }
    }
}
