//! Source files and the design units scanned from them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vunit_common::{ContentHash, ContentHasher, FileType, UnitName, VhdlStandard};
use vunit_diagnostics::DiagnosticSink;
use vunit_source::{normalize_path, FileId, SourceDb, Span};
use vunit_verilog_parser::{IncludedFile, VerilogDesignFile};
use vunit_vhdl_parser::VhdlDesignFile;

use crate::design_unit::{DesignUnit, UnitKind};
use crate::diagnostics;
use crate::error::ProjectError;

/// Stable identity of a source file within one project.
///
/// Survives replacement of the file with new content.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SourceFileId(u32);

impl SourceFileId {
    /// Creates an id from a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourceFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-file settings given when a file is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFileOptions {
    /// Language; derived from the extension when `None`.
    pub file_type: Option<FileType>,
    /// VHDL standard; the library default when `None`.
    pub vhdl_standard: Option<VhdlStandard>,
    /// Verilog preprocessor defines.
    pub defines: BTreeMap<String, String>,
    /// Verilog include search directories.
    pub include_dirs: Vec<PathBuf>,
    /// Track the file without scanning it, e.g. for encrypted IP.
    pub no_parse: bool,
    /// Tool options keyed `tool.option`.
    pub compile_options: BTreeMap<String, Vec<String>>,
}

/// What the scanner extracted from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignSummary {
    /// A scanned VHDL file.
    Vhdl(VhdlDesignFile),
    /// A preprocessed and scanned Verilog or SystemVerilog file.
    Verilog(VerilogDesignFile),
    /// Not scanned, either by request or because scanning failed.
    Unscanned,
}

/// One file of a library.
#[derive(Debug, Clone)]
pub struct SourceFile {
    id: SourceFileId,
    path: PathBuf,
    library: UnitName,
    file_type: FileType,
    vhdl_standard: VhdlStandard,
    defines: BTreeMap<String, String>,
    include_dirs: Vec<PathBuf>,
    no_parse: bool,
    compile_options: BTreeMap<String, Vec<String>>,
    design_units: Vec<DesignUnit>,
    summary: DesignSummary,
    text_hash: ContentHash,
    text_id: FileId,
}

impl SourceFile {
    /// Reads and scans `path` as a member of `library`.
    ///
    /// Scan failures are reported to `sink` and leave the file without
    /// design units; only an unreadable file is an error.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn scan(
        id: SourceFileId,
        path: &Path,
        library: UnitName,
        file_type: FileType,
        vhdl_standard: VhdlStandard,
        options: &SourceFileOptions,
        source_db: &mut SourceDb,
        sink: &DiagnosticSink,
    ) -> Result<Self, ProjectError> {
        for name in options.compile_options.keys() {
            validate_compile_option_name(name)?;
        }
        let path = normalize_path(path);
        let (text_id, bytes) = source_db
            .load_file(&path)
            .map_err(|e| ProjectError::io(&path, e))?;

        let mut file = Self {
            id,
            path,
            library,
            file_type,
            vhdl_standard,
            defines: options.defines.clone(),
            include_dirs: options.include_dirs.iter().map(|d| normalize_path(d)).collect(),
            no_parse: options.no_parse,
            compile_options: options.compile_options.clone(),
            design_units: Vec::new(),
            summary: DesignSummary::Unscanned,
            text_hash: ContentHash::from_bytes(&bytes),
            text_id,
        };
        if !file.no_parse {
            file.summary = file.scan_text(source_db, sink);
            file.design_units = file.collect_design_units();
        }
        tracing::debug!(
            path = %file.path.display(),
            library = %file.library,
            units = file.design_units.len(),
            "scanned source file"
        );
        Ok(file)
    }

    fn scan_text(&self, source_db: &mut SourceDb, sink: &DiagnosticSink) -> DesignSummary {
        let result: Result<DesignSummary, (String, Span)> = match self.file_type {
            FileType::Vhdl => vunit_vhdl_parser::parse_file(self.text_id, source_db)
                .map(DesignSummary::Vhdl)
                .map_err(|e| (e.message, e.span)),
            FileType::Verilog | FileType::SystemVerilog => vunit_verilog_parser::parse_file(
                self.text_id,
                source_db,
                &self.defines,
                &self.include_dirs,
                sink,
            )
            .map(DesignSummary::Verilog)
            .map_err(|e| (e.message, e.span)),
        };
        match result {
            Ok(summary) => summary,
            Err((message, span)) => {
                sink.emit(diagnostics::scan_failed(&self.path, &message, span));
                DesignSummary::Unscanned
            }
        }
    }

    fn collect_design_units(&self) -> Vec<DesignUnit> {
        let unit = |name: &UnitName, kind: UnitKind, span: Span| {
            DesignUnit::new(name.clone(), kind, self.library.clone(), self.id, span)
        };
        let mut units = Vec::new();
        match &self.summary {
            DesignSummary::Vhdl(design) => {
                for entity in &design.entities {
                    let mut u = unit(&entity.name.name, UnitKind::Entity, entity.name.span);
                    u.generic_names = entity.generics.iter().map(|g| g.to_string()).collect();
                    units.push(u);
                }
                for arch in &design.architectures {
                    let mut u = unit(&arch.name.name, UnitKind::Architecture, arch.name.span);
                    u.primary = Some(arch.entity.clone());
                    units.push(u);
                }
                for package in &design.packages {
                    units.push(unit(&package.name.name, UnitKind::Package, package.name.span));
                }
                for body in &design.package_bodies {
                    let mut u = unit(&body.name.name, UnitKind::PackageBody, body.name.span);
                    u.primary = Some(body.name.name.clone());
                    units.push(u);
                }
                for instance in &design.package_instances {
                    let mut u = unit(
                        &instance.name.name,
                        UnitKind::PackageInstance,
                        instance.name.span,
                    );
                    let library = if instance.library.matches("work") {
                        self.library.clone()
                    } else {
                        instance.library.clone()
                    };
                    u.generic_package = Some((library, instance.generic_package.clone()));
                    units.push(u);
                }
                for context in &design.contexts {
                    units.push(unit(&context.name.name, UnitKind::Context, context.name.span));
                }
                for config in &design.configurations {
                    let mut u = unit(&config.name.name, UnitKind::Configuration, config.name.span);
                    u.primary = Some(config.entity.clone());
                    u.configured_architecture = config.architecture.clone();
                    units.push(u);
                }
                units.sort_by_key(|u| u.span.start);
            }
            DesignSummary::Verilog(design) => {
                for module in &design.modules {
                    let mut u = unit(&module.name.name, UnitKind::Module, module.name.span);
                    u.generic_names = module.parameters.clone();
                    units.push(u);
                }
                for package in &design.packages {
                    units.push(unit(&package.name, UnitKind::Package, package.span));
                }
            }
            DesignSummary::Unscanned => {}
        }
        units
    }

    /// Project-wide identity.
    pub fn id(&self) -> SourceFileId {
        self.id
    }

    /// Normalized absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Owning library.
    pub fn library(&self) -> &UnitName {
        &self.library
    }

    /// Language of the file.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// VHDL standard in effect.
    pub fn vhdl_standard(&self) -> VhdlStandard {
        self.vhdl_standard
    }

    /// Verilog defines.
    pub fn defines(&self) -> &BTreeMap<String, String> {
        &self.defines
    }

    /// Verilog include directories.
    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// `true` if the file is tracked without being scanned.
    pub fn is_no_parse(&self) -> bool {
        self.no_parse
    }

    /// Units declared in the file, in declaration order.
    pub fn design_units(&self) -> &[DesignUnit] {
        &self.design_units
    }

    /// The scanner output.
    pub fn summary(&self) -> &DesignSummary {
        &self.summary
    }

    /// Files pulled in through `` `include ``.
    pub fn included_files(&self) -> &[IncludedFile] {
        match &self.summary {
            DesignSummary::Verilog(design) => &design.included_files,
            _ => &[],
        }
    }

    /// Names instantiated as components (VHDL) or modules (Verilog).
    pub fn depending_components(&self) -> Vec<&UnitName> {
        match &self.summary {
            DesignSummary::Vhdl(design) => design
                .component_instantiations
                .iter()
                .map(|c| &c.name)
                .collect(),
            DesignSummary::Verilog(design) => design.instances.iter().map(|i| &i.name).collect(),
            DesignSummary::Unscanned => Vec::new(),
        }
    }

    /// All tool options.
    pub fn compile_options(&self) -> &BTreeMap<String, Vec<String>> {
        &self.compile_options
    }

    /// Returns the values of a compile option.
    pub fn get_compile_option(&self, name: &str) -> Option<&[String]> {
        self.compile_options.get(name).map(Vec::as_slice)
    }

    /// Replaces the values of a compile option.
    pub fn set_compile_option(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) -> Result<(), ProjectError> {
        validate_compile_option_name(name)?;
        self.compile_options.insert(name.to_string(), values);
        Ok(())
    }

    /// Appends to the values of a compile option.
    pub fn add_compile_option(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) -> Result<(), ProjectError> {
        validate_compile_option_name(name)?;
        self.compile_options
            .entry(name.to_string())
            .or_default()
            .extend(values);
        Ok(())
    }

    /// Hash of everything that affects compiled output: text, language,
    /// VHDL standard, Verilog defines, include directories, included files
    /// and compile options.
    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .hash_field(&self.text_hash)
            .str_field(&self.file_type.to_string());
        match self.file_type {
            FileType::Vhdl => {
                hasher.str_field(self.vhdl_standard.year());
            }
            FileType::Verilog | FileType::SystemVerilog => {
                hasher.field(&(self.defines.len() as u64).to_le_bytes());
                for (name, value) in &self.defines {
                    hasher.str_field(name).str_field(value);
                }
                hasher.field(&(self.include_dirs.len() as u64).to_le_bytes());
                for dir in &self.include_dirs {
                    hasher.str_field(&dir.to_string_lossy());
                }
                let included = self.included_files();
                hasher.field(&(included.len() as u64).to_le_bytes());
                for file in included {
                    hasher
                        .str_field(&file.path.to_string_lossy())
                        .hash_field(&file.hash);
                }
            }
        }
        hasher.field(&(self.compile_options.len() as u64).to_le_bytes());
        for (name, values) in &self.compile_options {
            hasher
                .str_field(name)
                .field(&(values.len() as u64).to_le_bytes());
            for value in values {
                hasher.str_field(value);
            }
        }
        hasher.finish()
    }
}

fn validate_compile_option_name(name: &str) -> Result<(), ProjectError> {
    match name.split_once('.') {
        Some((tool, option)) if !tool.is_empty() && !option.is_empty() && !option.contains('.') => {
            Ok(())
        }
        _ => Err(ProjectError::InvalidCompileOption {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        dir: tempfile::TempDir,
        db: SourceDb,
        sink: DiagnosticSink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
                db: SourceDb::new(),
                sink: DiagnosticSink::new(),
            }
        }

        fn scan(&mut self, name: &str, text: &str, options: &SourceFileOptions) -> SourceFile {
            let path = self.dir.path().join(name);
            fs::write(&path, text).unwrap();
            let file_type = vunit_common::file_type_of(&path).unwrap();
            SourceFile::scan(
                SourceFileId::from_raw(0),
                &path,
                UnitName::new("lib"),
                file_type,
                options.vhdl_standard.unwrap_or_default(),
                options,
                &mut self.db,
                &self.sink,
            )
            .unwrap()
        }
    }

    fn kinds(file: &SourceFile) -> Vec<(String, UnitKind)> {
        file.design_units()
            .iter()
            .map(|u| (u.name.to_string(), u.kind))
            .collect()
    }

    #[test]
    fn vhdl_units_in_declaration_order() {
        let mut fx = Fixture::new();
        let file = fx.scan(
            "top.vhd",
            "package p is end package;
             package body p is end package body;
             entity e is generic (n : natural := 1); end entity;
             architecture a of e is begin end architecture;
             configuration c of e is for a end for; end configuration;",
            &SourceFileOptions::default(),
        );
        assert_eq!(
            kinds(&file),
            vec![
                ("p".to_string(), UnitKind::Package),
                ("p".to_string(), UnitKind::PackageBody),
                ("e".to_string(), UnitKind::Entity),
                ("a".to_string(), UnitKind::Architecture),
                ("c".to_string(), UnitKind::Configuration),
            ]
        );
        let entity = &file.design_units()[2];
        assert_eq!(entity.generic_names, vec!["n"]);
        let config = &file.design_units()[4];
        assert_eq!(config.primary.as_ref().map(|p| p.as_str()), Some("e"));
        assert_eq!(
            config.configured_architecture.as_ref().map(|a| a.as_str()),
            Some("a")
        );
    }

    #[test]
    fn package_instance_resolves_work() {
        let mut fx = Fixture::new();
        let file = fx.scan(
            "inst.vhd",
            "package int_queue is new work.generic_queue generic map (t => integer);",
            &SourceFileOptions::default(),
        );
        let unit = &file.design_units()[0];
        assert_eq!(unit.kind, UnitKind::PackageInstance);
        let (library, package) = unit.generic_package.clone().unwrap();
        assert_eq!(library.as_str(), "lib");
        assert_eq!(package.as_str(), "generic_queue");
    }

    #[test]
    fn no_parse_keeps_file_without_units() {
        let mut fx = Fixture::new();
        let options = SourceFileOptions {
            no_parse: true,
            ..SourceFileOptions::default()
        };
        let file = fx.scan("ip.vhd", "entity e is end entity;", &options);
        assert!(file.is_no_parse());
        assert!(file.design_units().is_empty());
        assert_eq!(file.summary(), &DesignSummary::Unscanned);
        assert!(!fx.sink.has_errors());
    }

    #[test]
    fn scan_failure_reports_once_and_yields_no_units() {
        let mut fx = Fixture::new();
        let file = fx.scan(
            "bad.vhd",
            "entity e is end entity; constant s : string := \"open",
            &SourceFileOptions::default(),
        );
        assert!(file.design_units().is_empty());
        assert_eq!(fx.sink.error_count(), 1);
    }

    #[test]
    fn verilog_scan_failure_reports_once_and_yields_no_units() {
        let mut fx = Fixture::new();
        let file = fx.scan(
            "bad.sv",
            "module m; endmodule\n/* never closed",
            &SourceFileOptions::default(),
        );
        assert!(file.design_units().is_empty());
        assert_eq!(file.summary(), &DesignSummary::Unscanned);
        assert_eq!(fx.sink.error_count(), 1);
    }

    #[test]
    fn verilog_modules_and_packages() {
        let mut fx = Fixture::new();
        let file = fx.scan(
            "top.sv",
            "package bus_pkg; endpackage
             module top #(parameter WIDTH = 8); fifo u0 (); endmodule",
            &SourceFileOptions::default(),
        );
        assert_eq!(
            kinds(&file),
            vec![
                ("top".to_string(), UnitKind::Module),
                ("bus_pkg".to_string(), UnitKind::Package),
            ]
        );
        assert_eq!(file.design_units()[0].generic_names, vec!["WIDTH"]);
        let components: Vec<_> = file.depending_components().iter().map(|c| c.as_str()).collect();
        assert_eq!(components, vec!["fifo"]);
    }

    #[test]
    fn hash_tracks_standard_and_defines() {
        let mut fx = Fixture::new();
        let text = "entity e is end entity;";
        let a = fx.scan("a.vhd", text, &SourceFileOptions::default());
        let b = fx.scan(
            "a.vhd",
            text,
            &SourceFileOptions {
                vhdl_standard: Some(VhdlStandard::Vhdl1993),
                ..SourceFileOptions::default()
            },
        );
        assert_ne!(a.content_hash(), b.content_hash());

        let v = "module m; endmodule";
        let plain = fx.scan("m.v", v, &SourceFileOptions::default());
        let mut defines = BTreeMap::new();
        defines.insert("WIDTH".to_string(), "8".to_string());
        let defined = fx.scan(
            "m.v",
            v,
            &SourceFileOptions {
                defines,
                ..SourceFileOptions::default()
            },
        );
        assert_ne!(plain.content_hash(), defined.content_hash());

        // Defines do not affect VHDL.
        let mut defines = BTreeMap::new();
        defines.insert("X".to_string(), "1".to_string());
        let vhdl_defined = fx.scan(
            "a.vhd",
            text,
            &SourceFileOptions {
                defines,
                ..SourceFileOptions::default()
            },
        );
        assert_eq!(a.content_hash(), vhdl_defined.content_hash());
    }

    #[test]
    fn included_file_change_changes_hash() {
        let mut fx = Fixture::new();
        fs::write(fx.dir.path().join("defs.svh"), "`define W 8\n").unwrap();
        let text = "`include \"defs.svh\"\nmodule m; endmodule\n";
        let before = fx.scan("m.sv", text, &SourceFileOptions::default());
        assert_eq!(before.included_files().len(), 1);

        fs::write(fx.dir.path().join("defs.svh"), "`define W 16\n").unwrap();
        let after = fx.scan("m.sv", text, &SourceFileOptions::default());
        assert_ne!(before.content_hash(), after.content_hash());
    }

    #[test]
    fn compile_options() {
        let mut fx = Fixture::new();
        let mut file = fx.scan("a.vhd", "entity e is end entity;", &SourceFileOptions::default());
        let initial = file.content_hash();

        file.set_compile_option("ghdl.a_flags", vec!["--relaxed".to_string()])
            .unwrap();
        file.add_compile_option("ghdl.a_flags", vec!["-frelaxed".to_string()])
            .unwrap();
        assert_eq!(
            file.get_compile_option("ghdl.a_flags").unwrap(),
            ["--relaxed", "-frelaxed"]
        );
        assert_ne!(file.content_hash(), initial);
        assert!(file.get_compile_option("modelsim.vcom_flags").is_none());

        for bad in ["flags", ".flags", "ghdl.", "a.b.c"] {
            let err = file.set_compile_option(bad, Vec::new()).unwrap_err();
            assert!(matches!(err, ProjectError::InvalidCompileOption { .. }));
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut fx = Fixture::new();
        let path = fx.dir.path().join("missing.vhd");
        let err = SourceFile::scan(
            SourceFileId::from_raw(0),
            &path,
            UnitName::new("lib"),
            FileType::Vhdl,
            VhdlStandard::default(),
            &SourceFileOptions::default(),
            &mut fx.db,
            &fx.sink,
        )
        .unwrap_err();
        assert!(matches!(err, ProjectError::Io { .. }));
    }
}
