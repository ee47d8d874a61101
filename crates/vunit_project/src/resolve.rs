//! Turning scanned references into file dependencies.

use std::path::PathBuf;

use vunit_common::{FileType, UnitName};
use vunit_diagnostics::DiagnosticSink;
use vunit_source::Span;
use vunit_vhdl_parser::{NameWithin, VhdlReference};

use crate::design_unit::{DesignUnit, UnitKind};
use crate::diagnostics;
use crate::error::ProjectError;
use crate::graph::DependencyGraph;
use crate::library::{Library, LibraryKind};
use crate::source_file::{DesignSummary, SourceFile, SourceFileId};

/// A default architecture binding no configuration settles.
#[derive(Debug, Clone)]
pub(crate) struct Ambiguity {
    library: String,
    entity: String,
    architectures: Vec<String>,
    referenced_from: PathBuf,
    span: Span,
}

impl Ambiguity {
    pub(crate) fn warn(&self, sink: &DiagnosticSink) {
        sink.emit(diagnostics::ambiguous_architecture(
            &self.library,
            &self.entity,
            &self.architectures,
            self.span,
        ));
    }

    pub(crate) fn into_error(self) -> ProjectError {
        ProjectError::AmbiguousArchitecture {
            library: self.library,
            entity: self.entity,
            architectures: self.architectures,
            referenced_from: self.referenced_from,
        }
    }
}

/// Which edges to derive.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgePolicy {
    /// Package users also depend on the package body.
    pub depend_on_package_body: bool,
    /// VHDL component instantiations produce edges. Verilog module
    /// instances always do.
    pub components: bool,
    /// Bind entity instantiations to a concrete architecture.
    pub implementation: bool,
}

/// Builds a [`DependencyGraph`] from the current unit tables.
pub(crate) struct GraphBuilder<'a> {
    libraries: &'a [Library],
    files: &'a [SourceFile],
    sink: &'a DiagnosticSink,
    policy: EdgePolicy,
    ambiguities: Vec<Ambiguity>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(
        libraries: &'a [Library],
        files: &'a [SourceFile],
        sink: &'a DiagnosticSink,
        policy: EdgePolicy,
    ) -> Self {
        Self {
            libraries,
            files,
            sink,
            policy,
            ambiguities: Vec::new(),
        }
    }

    /// Adds every file as a node in library order, derives edges and then
    /// replays `manual` edges.
    pub(crate) fn build(
        mut self,
        manual: &[(SourceFileId, SourceFileId)],
    ) -> (DependencyGraph, Vec<Ambiguity>) {
        let (libraries, files) = (self.libraries, self.files);
        let mut graph = DependencyGraph::new();
        for library in libraries {
            for &id in library.source_files() {
                graph.add_node(id);
            }
        }

        for library in libraries {
            for &id in library.source_files() {
                let Some(file) = files.get(id.index()) else {
                    continue;
                };
                let mut deps = Vec::new();
                self.file_dependencies(library, file, &mut deps);
                for dep in deps {
                    if graph.add_dependency(id, dep) {
                        tracing::debug!(
                            file = %file.path().display(),
                            depends_on = %self.path_of(dep).display(),
                            "adding dependency"
                        );
                    }
                }
            }
        }

        for &(file, depends_on) in manual {
            graph.add_dependency(file, depends_on);
        }
        (graph, self.ambiguities)
    }

    fn path_of(&self, id: SourceFileId) -> PathBuf {
        self.files
            .get(id.index())
            .map_or_else(PathBuf::new, |f| f.path().to_path_buf())
    }

    fn library(&self, name: &UnitName) -> Option<&'a Library> {
        self.libraries.iter().find(|l| l.name() == name)
    }

    fn file_dependencies(
        &mut self,
        library: &'a Library,
        file: &SourceFile,
        deps: &mut Vec<SourceFileId>,
    ) {
        self.secondary_unit_dependencies(library, file, deps);
        match file.summary() {
            DesignSummary::Vhdl(design) => {
                for reference in &design.references {
                    let reference = reference.resolve_work(library.name());
                    self.reference_dependencies(file, &reference, deps);
                }
                if self.policy.components {
                    for component in &design.component_instantiations {
                        let target = Instantiation {
                            name: &component.name,
                            span: component.span,
                            from_verilog: false,
                        };
                        self.component_dependencies(library, &design.libraries, target, deps);
                    }
                }
            }
            DesignSummary::Verilog(design) => {
                for package in design.imports.iter().chain(&design.package_references) {
                    self.verilog_package_dependencies(library, &package.name, deps);
                }
                for instance in &design.instances {
                    let target = Instantiation {
                        name: &instance.name,
                        span: instance.span,
                        from_verilog: true,
                    };
                    self.component_dependencies(library, &[], target, deps);
                }
            }
            DesignSummary::Unscanned => {}
        }
    }

    /// Architectures and package bodies depend on their primary unit;
    /// configurations depend on their entity and all its architectures.
    fn secondary_unit_dependencies(
        &self,
        library: &Library,
        file: &SourceFile,
        deps: &mut Vec<SourceFileId>,
    ) {
        for unit in file.design_units() {
            let Some(primary_name) = &unit.primary else {
                continue;
            };
            let Some(primary) = library.primary_unit(primary_name.key()) else {
                self.sink.emit(diagnostics::missing_primary_unit(
                    primary_name.as_str(),
                    library.name().as_str(),
                    unit.span,
                ));
                continue;
            };
            deps.push(primary.source_file);
            if unit.kind == UnitKind::Configuration {
                deps.extend(
                    library
                        .architectures_of(primary_name.key())
                        .iter()
                        .map(|a| a.source_file),
                );
            }
        }
    }

    fn reference_dependencies(
        &mut self,
        file: &SourceFile,
        reference: &VhdlReference,
        deps: &mut Vec<SourceFileId>,
    ) {
        let Some(library) = self.library(&reference.library) else {
            self.sink.emit(diagnostics::unknown_library(
                reference.library.as_str(),
                reference.span,
            ));
            return;
        };
        let Some(unit) = library.primary_unit(reference.unit.key()) else {
            if library.kind() == LibraryKind::Local {
                self.sink.emit(diagnostics::missing_primary_unit(
                    reference.unit.as_str(),
                    library.name().as_str(),
                    reference.span,
                ));
            }
            return;
        };
        deps.push(unit.source_file);

        if unit.kind.is_package_like() && self.policy.depend_on_package_body {
            if let Some(body) = library.get_package_body(unit.name.key()) {
                deps.push(body.source_file);
            }
        }

        if !reference.is_entity_reference() {
            return;
        }
        match &reference.name_within {
            NameWithin::Named(architecture) => {
                match library.architecture(unit.name.key(), architecture.key()) {
                    Some(arch) => deps.push(arch.source_file),
                    None => self.sink.emit(diagnostics::missing_architecture(
                        file.path(),
                        library.name().as_str(),
                        unit.name.as_str(),
                        architecture.as_str(),
                        reference.span,
                    )),
                }
            }
            NameWithin::All => deps.extend(
                library
                    .architectures_of(unit.name.key())
                    .iter()
                    .map(|a| a.source_file),
            ),
            NameWithin::None if self.policy.implementation => {
                self.default_binding(library, unit, file, reference.span, deps);
            }
            NameWithin::None => {}
        }
    }

    /// Binds `entity lib.ent` without an architecture: the only
    /// architecture, or the one every configuration of the entity selects.
    fn default_binding(
        &mut self,
        library: &Library,
        entity: &DesignUnit,
        file: &SourceFile,
        span: Span,
        deps: &mut Vec<SourceFileId>,
    ) {
        let names = library.architecture_names(entity.name.key());
        match names.as_slice() {
            [] => {}
            [only] => {
                if let Some(arch) = library.architecture(entity.name.key(), only.key()) {
                    deps.push(arch.source_file);
                }
            }
            _ => {
                let configurations: Vec<&DesignUnit> = library
                    .configurations_of(entity.name.key())
                    .filter(|c| {
                        c.configured_architecture
                            .as_ref()
                            .is_some_and(|a| names.contains(&a))
                    })
                    .collect();
                let mut selected: Vec<&UnitName> = Vec::new();
                for config in &configurations {
                    if let Some(arch) = &config.configured_architecture {
                        if !selected.contains(&arch) {
                            selected.push(arch);
                        }
                    }
                }
                if let [arch_name] = selected.as_slice() {
                    if let Some(arch) = library.architecture(entity.name.key(), arch_name.key()) {
                        deps.push(arch.source_file);
                    }
                    deps.extend(configurations.iter().map(|c| c.source_file));
                    return;
                }
                self.ambiguities.push(Ambiguity {
                    library: library.name().to_string(),
                    entity: entity.name.to_string(),
                    architectures: names.iter().map(|n| n.to_string()).collect(),
                    referenced_from: file.path().to_path_buf(),
                    span,
                });
            }
        }
    }

    /// Components and module instances bind to an entity or module of the
    /// same name, together with all its architectures. The file's own
    /// library is searched first, then the libraries it names in `library`
    /// clauses, then every library.
    fn component_dependencies(
        &self,
        home: &'a Library,
        named: &[UnitName],
        target: Instantiation<'_>,
        deps: &mut Vec<SourceFileId>,
    ) {
        let named: Vec<&'a Library> = named
            .iter()
            .filter(|n| *n != home.name())
            .filter_map(|n| self.library(n))
            .collect();
        let tiers: [Vec<&'a Library>; 3] = [
            vec![home],
            named,
            self.libraries.iter().collect(),
        ];
        let binds = |unit: &&DesignUnit| {
            matches!(unit.kind, UnitKind::Entity | UnitKind::Module)
                && (!target.from_verilog || self.verilog_name_matches(unit, target.name))
        };
        let candidates: Vec<(&'a Library, &'a DesignUnit)> = tiers
            .iter()
            .map(|tier| {
                tier.iter()
                    .filter_map(|&lib| {
                        let unit = lib.primary_unit(target.name.key()).filter(binds)?;
                        Some((lib, unit))
                    })
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        if candidates.is_empty() {
            if target.from_verilog {
                tracing::debug!(name = %target.name, "no module found for instance");
            } else {
                self.sink
                    .emit(diagnostics::unmatched_component(target.name.as_str(), target.span));
            }
            return;
        }
        if candidates.len() > 1 && !target.from_verilog {
            let libraries: Vec<String> = candidates
                .iter()
                .map(|(lib, _)| lib.name().to_string())
                .collect();
            self.sink.emit(diagnostics::ambiguous_component(
                target.name.as_str(),
                &libraries,
                target.span,
            ));
        }
        for (library, unit) in candidates {
            deps.push(unit.source_file);
            deps.extend(
                library
                    .architectures_of(unit.name.key())
                    .iter()
                    .map(|a| a.source_file),
            );
        }
    }

    /// Verilog identifiers are case-sensitive; VHDL units still match
    /// regardless of case.
    fn verilog_name_matches(&self, unit: &DesignUnit, name: &UnitName) -> bool {
        let declared_in_verilog = self
            .files
            .get(unit.source_file.index())
            .is_some_and(|f| f.file_type() != FileType::Vhdl);
        !declared_in_verilog || unit.name.as_str() == name.as_str()
    }

    /// `import pkg::*` and `pkg::name` bind to a package of that name, in the
    /// file's own library first.
    fn verilog_package_dependencies(
        &self,
        library: &Library,
        name: &UnitName,
        deps: &mut Vec<SourceFileId>,
    ) {
        let is_package =
            |u: &&DesignUnit| u.kind == UnitKind::Package && self.verilog_name_matches(u, name);
        let found = library
            .primary_unit(name.key())
            .filter(is_package)
            .or_else(|| {
                self.libraries
                    .iter()
                    .find_map(|lib| lib.primary_unit(name.key()).filter(is_package))
            });
        match found {
            Some(package) => deps.push(package.source_file),
            None => tracing::debug!(package = %name, "no package found for import"),
        }
    }
}

/// A component or module instantiation to bind.
#[derive(Clone, Copy)]
struct Instantiation<'n> {
    name: &'n UnitName,
    span: Span,
    from_verilog: bool,
}
