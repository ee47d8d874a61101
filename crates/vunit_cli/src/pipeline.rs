//! Shared steps: locating `vunit.toml`, loading the project and printing.

use std::path::{Path, PathBuf};

use serde::Serialize;
use vunit_config::CONFIG_FILE;
use vunit_diagnostics::{DiagnosticRenderer, Severity, TerminalRenderer};
use vunit_project::{Project, SourceFileId};
use vunit_source::normalize_path;

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` to the first directory containing `vunit.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// The project root from `--config` (file or directory) or the current
/// directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_file() {
                Ok(path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(path)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Loads `vunit.toml` and scans every file it lists.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let root = resolve_project_root(global)?;
    let config = vunit_config::load_config(&root)?;
    let project = Project::from_config(&config, &root)?;
    if !global.quiet {
        eprintln!(
            "   Scanned {} file(s) in {} libraries",
            project.get_source_files_in_order().len(),
            project
                .get_libraries()
                .iter()
                .filter(|l| !l.source_files().is_empty())
                .count()
        );
    }
    Ok(project)
}

/// Prints everything the project reported. Notes are skipped with `--quiet`.
pub fn render_diagnostics(project: &Project, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in project.diagnostics().take_all() {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprintln!("{}", renderer.render(&diag, project.source_db()));
    }
}

/// Maps command-line paths to project files, in any library.
pub fn resolve_targets(
    project: &Project,
    targets: &[String],
) -> Result<Vec<SourceFileId>, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let mut ids = Vec::new();
    for target in targets {
        let path = normalize_path(&cwd.join(target));
        let found: Vec<SourceFileId> = project
            .get_source_files_in_order()
            .iter()
            .filter(|f| f.path() == path)
            .map(|f| f.id())
            .collect();
        if found.is_empty() {
            return Err(format!("'{target}' is not a file of this project").into());
        }
        ids.extend(found);
    }
    Ok(ids)
}

#[derive(Debug, Serialize)]
struct FileEntry {
    library: String,
    path: String,
}

/// Writes `ids` to stdout in the requested format.
pub fn print_files(project: &Project, ids: &[SourceFileId], format: ReportFormat) {
    let entries: Vec<FileEntry> = ids
        .iter()
        .filter_map(|&id| project.source_file(id))
        .map(|f| FileEntry {
            library: f.library().to_string(),
            path: f.path().display().to_string(),
        })
        .collect();
    match format {
        ReportFormat::Text => {
            for entry in &entries {
                println!("{} {}", entry.library, entry.path);
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "[project]\noutput_path = \"out\"\n\n[libraries.lib]\nfiles = [\"pkg.vhd\"]\n";

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            color: false,
            config: config.map(|p| p.to_string_lossy().into_owned()),
        }
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        let sub = tmp.path().join("src");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find vunit.toml"));
    }

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join(CONFIG_FILE);
        fs::write(&config, CONFIG).unwrap();
        assert_eq!(resolve_project_root(&global(Some(&config))).unwrap(), tmp.path());
        assert_eq!(
            resolve_project_root(&global(Some(tmp.path()))).unwrap(),
            tmp.path()
        );
    }

    #[test]
    fn load_project_scans_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), CONFIG).unwrap();
        fs::write(tmp.path().join("pkg.vhd"), "package pkg is end package;").unwrap();
        let project = load_project(&global(Some(tmp.path()))).unwrap();
        assert_eq!(project.get_source_files_in_order().len(), 1);

        let target = tmp.path().join("pkg.vhd").to_string_lossy().into_owned();
        let ids = resolve_targets(&project, &[target]).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(resolve_targets(&project, &["nope.vhd".to_string()]).is_err());
    }
}
