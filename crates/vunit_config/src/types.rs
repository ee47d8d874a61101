//! Configuration types deserialized from `vunit.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use vunit_common::{FileType, VhdlStandard};

/// The top-level project description parsed from `vunit.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project-wide settings.
    pub project: ProjectSection,
    /// Libraries by logical name.
    #[serde(default)]
    pub libraries: BTreeMap<String, LibraryConfig>,
    /// Per-file option overrides and extra files.
    #[serde(default)]
    pub files: Vec<FileOverride>,
    /// Edges added on top of the ones found by scanning.
    #[serde(default)]
    pub manual_dependencies: Vec<ManualDependency>,
}

/// The `[project]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Directory for compiled libraries and the hash cache, relative to the
    /// configuration file.
    #[serde(default)]
    pub output_path: String,
    /// Users of a package also depend on its body.
    #[serde(default)]
    pub depend_on_package_body: bool,
    /// VHDL component instantiations produce edges in declaration-level
    /// dependency queries too.
    #[serde(default)]
    pub depend_on_components: bool,
    /// Libraries assumed to be compiled outside the project.
    #[serde(default = "default_builtin_libraries")]
    pub builtin_libraries: Vec<String>,
}

fn default_builtin_libraries() -> Vec<String> {
    vec!["ieee".to_string(), "std".to_string()]
}

/// A `[libraries.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryConfig {
    /// Compiled library location; defaults to `<output_path>/libraries/<name>`.
    #[serde(default)]
    pub directory: Option<String>,
    /// Default VHDL standard for files in this library.
    #[serde(default)]
    pub vhdl_standard: Option<VhdlStandard>,
    /// Source files, relative to the configuration file.
    #[serde(default)]
    pub files: Vec<String>,
    /// Pre-compiled library location. External libraries list no files.
    #[serde(default)]
    pub external: Option<String>,
}

/// A `[[files]]` entry.
///
/// With `library` set, the file is added to that library if it is not
/// already listed there. Without it, the options apply to every library that
/// lists `path`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileOverride {
    /// Source path, relative to the configuration file.
    pub path: String,
    /// Library the override applies to.
    #[serde(default)]
    pub library: Option<String>,
    /// Language, when the extension is not enough.
    #[serde(default)]
    pub file_type: Option<FileType>,
    /// Verilog preprocessor defines.
    #[serde(default)]
    pub defines: BTreeMap<String, String>,
    /// Verilog include search directories, relative to the configuration file.
    #[serde(default)]
    pub include_dirs: Vec<String>,
    /// Track the file without scanning it.
    #[serde(default)]
    pub no_parse: bool,
    /// VHDL standard for this file only.
    #[serde(default)]
    pub vhdl_standard: Option<VhdlStandard>,
    /// Tool options keyed `tool.option`.
    #[serde(default)]
    pub compile_options: BTreeMap<String, Vec<String>>,
}

/// A `[[manual_dependencies]]` entry: `file` must be compiled after `depends_on`.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualDependency {
    /// The dependent file.
    pub file: String,
    /// The file it depends on.
    pub depends_on: String,
}

impl ProjectConfig {
    /// Returns `true` if `name` is declared under `[libraries]`, ignoring case.
    pub fn has_library(&self, name: &str) -> bool {
        self.libraries.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Looks up a library table, ignoring case.
    pub fn library(&self, name: &str) -> Option<(&str, &LibraryConfig)> {
        self.libraries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, v)| (k.as_str(), v))
    }
}
