//! Resolution of a configuration into absolute library and file lists.

use crate::types::{FileOverride, LibraryConfig, ProjectConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vunit_common::{FileType, VhdlStandard};

/// A library with its directories made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    /// Logical name as written in the configuration.
    pub name: String,
    /// Compiled library location.
    pub directory: PathBuf,
    /// Default standard for the library's VHDL files.
    pub vhdl_standard: Option<VhdlStandard>,
    /// Set for pre-compiled libraries.
    pub external: Option<PathBuf>,
}

/// One source file with every override folded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Owning library.
    pub library: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Explicit language, if overridden.
    pub file_type: Option<FileType>,
    /// Verilog defines.
    pub defines: BTreeMap<String, String>,
    /// Absolute include directories.
    pub include_dirs: Vec<PathBuf>,
    /// Track without scanning.
    pub no_parse: bool,
    /// File-specific VHDL standard.
    pub vhdl_standard: Option<VhdlStandard>,
    /// Tool options keyed `tool.option`.
    pub compile_options: BTreeMap<String, Vec<String>>,
}

/// Lists libraries in name order with paths resolved against `root`.
pub fn resolve_libraries(config: &ProjectConfig, root: &Path) -> Vec<ResolvedLibrary> {
    let output_path = root.join(&config.project.output_path);
    config
        .libraries
        .iter()
        .map(|(name, library)| resolve_library(name, library, root, &output_path))
        .collect()
}

fn resolve_library(
    name: &str,
    library: &LibraryConfig,
    root: &Path,
    output_path: &Path,
) -> ResolvedLibrary {
    let external = library.external.as_ref().map(|p| root.join(p));
    let directory = match (&library.directory, &external) {
        (Some(dir), _) => root.join(dir),
        (None, Some(ext)) => ext.clone(),
        (None, None) => output_path.join("libraries").join(name),
    };
    ResolvedLibrary {
        name: name.to_string(),
        directory,
        vhdl_standard: library.vhdl_standard,
        external,
    }
}

/// Lists every source file, library by library in name order.
///
/// Within a library, files appear in listed order followed by files that
/// only an override with `library = ...` adds.
pub fn resolve_sources(config: &ProjectConfig, root: &Path) -> Vec<ResolvedSource> {
    let mut sources = Vec::new();
    for (name, library) in &config.libraries {
        let mut paths: Vec<&str> = library.files.iter().map(String::as_str).collect();
        for file in &config.files {
            let targets_library = file
                .library
                .as_deref()
                .is_some_and(|lib| lib.eq_ignore_ascii_case(name));
            if targets_library && !paths.iter().any(|p| same_path(p, &file.path)) {
                paths.push(&file.path);
            }
        }

        for path in paths {
            let mut source = ResolvedSource {
                library: name.clone(),
                path: root.join(path),
                ..ResolvedSource::default()
            };
            for file in config
                .files
                .iter()
                .filter(|f| same_path(&f.path, path) && applies_to(f, name))
            {
                apply_override(&mut source, file, root);
            }
            sources.push(source);
        }
    }
    sources
}

/// Manual dependencies as absolute `(file, depends_on)` pairs.
pub fn resolve_manual_dependencies(config: &ProjectConfig, root: &Path) -> Vec<(PathBuf, PathBuf)> {
    config
        .manual_dependencies
        .iter()
        .map(|dep| (root.join(&dep.file), root.join(&dep.depends_on)))
        .collect()
}

fn same_path(a: &str, b: &str) -> bool {
    Path::new(a) == Path::new(b)
}

fn applies_to(file: &FileOverride, library: &str) -> bool {
    file.library
        .as_deref()
        .map_or(true, |lib| lib.eq_ignore_ascii_case(library))
}

fn apply_override(source: &mut ResolvedSource, file: &FileOverride, root: &Path) {
    if file.file_type.is_some() {
        source.file_type = file.file_type;
    }
    if file.vhdl_standard.is_some() {
        source.vhdl_standard = file.vhdl_standard;
    }
    source.no_parse |= file.no_parse;
    source
        .defines
        .extend(file.defines.iter().map(|(k, v)| (k.clone(), v.clone())));
    source
        .include_dirs
        .extend(file.include_dirs.iter().map(|d| root.join(d)));
    source.compile_options.extend(
        file.compile_options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const CONFIG: &str = r#"
[project]
output_path = "out"

[libraries.lib]
vhdl_standard = "93"
files = ["src/a.vhd", "src/b.sv"]

[libraries.tb]
directory = "build/tb"
files = ["tb/tb.vhd"]

[libraries.vendor]
external = "/opt/vendor"

[[files]]
path = "src/b.sv"
defines = { WIDTH = "8" }
include_dirs = ["inc"]

[[files]]
path = "tb/extra.vhd"
library = "tb"
no_parse = true
compile_options = { "modelsim.vcom_flags" = ["-quiet"] }

[[manual_dependencies]]
file = "tb/tb.vhd"
depends_on = "tb/extra.vhd"
"#;

    #[test]
    fn libraries_resolve_directories() {
        let config = load_config_from_str(CONFIG).unwrap();
        let libs = resolve_libraries(&config, Path::new("/proj"));
        let names: Vec<_> = libs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["lib", "tb", "vendor"]);
        assert_eq!(libs[0].directory, Path::new("/proj/out/libraries/lib"));
        assert_eq!(libs[0].vhdl_standard, Some(VhdlStandard::Vhdl1993));
        assert_eq!(libs[1].directory, Path::new("/proj/build/tb"));
        assert_eq!(libs[2].external.as_deref(), Some(Path::new("/opt/vendor")));
        assert_eq!(libs[2].directory, Path::new("/opt/vendor"));
    }

    #[test]
    fn sources_fold_overrides() {
        let config = load_config_from_str(CONFIG).unwrap();
        let sources = resolve_sources(&config, Path::new("/proj"));
        let paths: Vec<_> = sources.iter().map(|s| s.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/proj/src/a.vhd"),
                PathBuf::from("/proj/src/b.sv"),
                PathBuf::from("/proj/tb/tb.vhd"),
                PathBuf::from("/proj/tb/extra.vhd"),
            ]
        );
        assert!(sources[0].defines.is_empty());
        assert_eq!(sources[1].defines["WIDTH"], "8");
        assert_eq!(sources[1].include_dirs, vec![PathBuf::from("/proj/inc")]);
        assert_eq!(sources[3].library, "tb");
        assert!(sources[3].no_parse);
        assert_eq!(
            sources[3].compile_options["modelsim.vcom_flags"],
            vec!["-quiet"]
        );
    }

    #[test]
    fn manual_dependencies_are_absolute() {
        let config = load_config_from_str(CONFIG).unwrap();
        let deps = resolve_manual_dependencies(&config, Path::new("/proj"));
        assert_eq!(
            deps,
            vec![(
                PathBuf::from("/proj/tb/tb.vhd"),
                PathBuf::from("/proj/tb/extra.vhd")
            )]
        );
    }
}
