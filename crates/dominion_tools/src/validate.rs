//! Data validation utilities.

use std::path::{Path, PathBuf};

use dominion_core::data::GameConfig;

use crate::error::{Result, ToolError};

/// Outcome of validating a directory of config files.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Files that parsed and validated.
    pub valid: Vec<PathBuf>,
    /// Files that failed, with the reason.
    pub invalid: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// Whether every file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Load and validate one RON game config.
pub fn validate_config_file(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    GameConfig::from_ron_str(&text).map_err(|source| ToolError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate all `.ron` game configs in a directory.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be read; bad files
/// are collected in the report.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport> {
    let entries = std::fs::read_dir(path).map_err(|e| ToolError::io(path, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut report = ValidationReport::default();
    for file in files {
        match validate_config_file(&file) {
            Ok(_) => {
                tracing::debug!(path = %file.display(), "Config valid");
                report.valid.push(file);
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), %err, "Config invalid");
                report.invalid.push((file, err.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_report() {
        let dir = tempfile::tempdir().unwrap();
        let good = GameConfig::default().with_players(3).to_ron_string().unwrap();
        std::fs::write(dir.path().join("good.ron"), good).unwrap();
        std::fs::write(dir.path().join("bad.ron"), "(players: 9)").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = validate_data_directory(dir.path()).unwrap();
        assert_eq!(report.valid.len(), 1);
        assert_eq!(report.invalid.len(), 1);
        assert!(report.invalid[0].0.ends_with("bad.ron"));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.ron");
        std::fs::write(&path, "(map_radius: 3, seed: 5)").unwrap();
        let config = validate_config_file(&path).unwrap();
        assert_eq!(config.map_radius, 3);
        assert_eq!(config.players, 2);
    }

    #[test]
    fn test_missing_directory() {
        assert!(validate_data_directory(Path::new("/no/such/dir")).is_err());
    }
}
