//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "vunit.toml";

/// Loads and validates `vunit.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `vunit.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.output_path.is_empty() {
        return Err(ConfigError::MissingField("project.output_path".to_string()));
    }

    for (name, library) in &config.libraries {
        if library.external.is_some() && !library.files.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "external library '{name}' cannot list source files"
            )));
        }
    }

    for file in &config.files {
        match &file.library {
            Some(library) => {
                let (name, table) = config
                    .library(library)
                    .ok_or_else(|| ConfigError::UnknownLibrary(library.clone()))?;
                if table.external.is_some() {
                    return Err(ConfigError::ValidationError(format!(
                        "file '{}' cannot be added to external library '{name}'",
                        file.path
                    )));
                }
            }
            None => {
                let listed = config
                    .libraries
                    .values()
                    .any(|lib| lib.files.iter().any(|f| Path::new(f) == Path::new(&file.path)));
                if !listed {
                    return Err(ConfigError::ValidationError(format!(
                        "override for '{}' matches no listed file",
                        file.path
                    )));
                }
            }
        }
    }

    for dep in &config.manual_dependencies {
        if dep.file.is_empty() || dep.depends_on.is_empty() {
            return Err(ConfigError::MissingField(
                "manual_dependencies.file / depends_on".to_string(),
            ));
        }
    }
    Ok(())
}
