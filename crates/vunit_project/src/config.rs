//! Building a [`Project`] from a `vunit.toml` description.

use std::path::Path;

use vunit_config::{resolve_libraries, resolve_manual_dependencies, resolve_sources, ProjectConfig};
use vunit_source::normalize_path;

use crate::error::ProjectError;
use crate::project::{Project, ProjectOptions};
use crate::source_file::{SourceFileId, SourceFileOptions};

impl Project {
    /// Creates the project described by `config`, with relative paths taken
    /// from `root`. Every listed file is read and scanned.
    pub fn from_config(config: &ProjectConfig, root: &Path) -> Result<Self, ProjectError> {
        let options = ProjectOptions {
            depend_on_package_body: config.project.depend_on_package_body,
            depend_on_components: config.project.depend_on_components,
        };
        let mut project =
            Project::without_builtins(root.join(&config.project.output_path), options);

        for name in &config.project.builtin_libraries {
            project.add_builtin_library(name)?;
        }
        for library in resolve_libraries(config, root) {
            match library.external {
                Some(path) => project.add_external_library(&library.name, path)?,
                None => project.add_library(
                    &library.name,
                    library.directory,
                    library.vhdl_standard.unwrap_or_default(),
                )?,
            }
        }

        for source in resolve_sources(config, root) {
            let options = SourceFileOptions {
                file_type: source.file_type,
                vhdl_standard: source.vhdl_standard,
                defines: source.defines,
                include_dirs: source.include_dirs,
                no_parse: source.no_parse,
                compile_options: source.compile_options,
            };
            project.add_source_file(&source.path, &source.library, options)?;
        }

        for (file, depends_on) in resolve_manual_dependencies(config, root) {
            let file = project.file_at(&file)?;
            let depends_on = project.file_at(&depends_on)?;
            project.add_manual_dependency(file, depends_on)?;
        }
        Ok(project)
    }

    /// The first file added from `path`, in any library.
    fn file_at(&self, path: &Path) -> Result<SourceFileId, ProjectError> {
        let normalized = normalize_path(path);
        self.get_source_files_in_order()
            .iter()
            .find(|f| f.path() == normalized)
            .map(|f| f.id())
            .ok_or_else(|| ProjectError::UnknownSourceFile(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use vunit_config::load_config_from_str;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn builds_libraries_and_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pkg.vhd", "package pkg is end package;");
        write(
            dir.path(),
            "ent.vhd",
            "use work.pkg.all;\nentity ent is end entity;",
        );
        let config = load_config_from_str(
            r#"
            [project]
            output_path = "out"
            depend_on_package_body = true

            [libraries.Lib]
            files = ["pkg.vhd", "ent.vhd"]
            "#,
        )
        .unwrap();

        let project = Project::from_config(&config, dir.path()).unwrap();
        assert!(project.options().depend_on_package_body);
        assert!(project.has_library("lib"));
        assert!(project.get_library("ieee").unwrap().is_builtin());

        let order = project.get_files_in_compile_order(false).unwrap();
        let names: Vec<_> = project
            .paths_of(&order)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pkg.vhd", "ent.vhd"]);
    }

    #[test]
    fn custom_builtins_replace_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_str(
            r#"
            [project]
            output_path = "out"
            builtin_libraries = ["vendor"]
            "#,
        )
        .unwrap();
        let project = Project::from_config(&config, dir.path()).unwrap();
        assert!(project.get_library("vendor").unwrap().is_builtin());
        assert!(!project.has_library("ieee"));
    }

    #[test]
    fn manual_dependency_by_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.vhd", "package a is end package;");
        write(dir.path(), "b.vhd", "package b is end package;");
        let config = load_config_from_str(
            r#"
            [project]
            output_path = "out"

            [libraries.lib]
            files = ["a.vhd", "b.vhd"]

            [[manual_dependencies]]
            file = "a.vhd"
            depends_on = "b.vhd"
            "#,
        )
        .unwrap();
        let project = Project::from_config(&config, dir.path()).unwrap();
        let order = project.get_files_in_compile_order(false).unwrap();
        let b = project.get_source_file(dir.path().join("b.vhd"), "lib").unwrap();
        assert_eq!(order[0], b.id());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_str(
            r#"
            [project]
            output_path = "out"

            [libraries.lib]
            files = ["missing.vhd"]
            "#,
        )
        .unwrap();
        let err = Project::from_config(&config, dir.path()).err().unwrap();
        assert!(matches!(err, ProjectError::Io { .. }));
    }
}
