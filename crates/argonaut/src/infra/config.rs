//! Startup configuration loaded from `~/.argonaut/config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative directory name for argonaut state under the user home.
pub const ARGONAUT_DIR: &str = ".argonaut";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "argonaut.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Returns the argonaut home directory (`~/.argonaut`).
pub fn argonaut_home() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(ARGONAUT_DIR);
    }

    PathBuf::from(ARGONAUT_DIR)
}

/// Embedding-level configuration consumed by the core at startup.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArgonautConfig {
    /// Control-plane base URL.
    pub server: Option<String>,
    /// Bearer token for the control plane.
    pub token: Option<String>,
    /// Skip TLS verification.
    pub insecure: bool,
    /// External diff viewer command with `{left}`/`{right}` placeholders.
    pub diff_viewer: Option<String>,
    /// Command a rendered diff is piped through before display.
    pub diff_formatter: Option<String>,
    /// Pager used for long text views.
    pub pager: Option<String>,
    /// Command run by `:upgrade`.
    pub upgrade_command: Option<String>,
    /// Theme name; validated against the built-in palettes.
    pub theme: Option<String>,
    /// Log file path; defaults to `~/.argonaut/argonaut.log`.
    pub log_file: Option<PathBuf>,
}

impl ArgonautConfig {
    /// Loads the config file, treating a missing file as defaults.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default config file location.
    pub fn default_path() -> PathBuf {
        argonaut_home().join(CONFIG_FILE)
    }

    /// Returns the effective log file path.
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| argonaut_home().join(LOG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.json");

        // Act
        let config = ArgonautConfig::load(&path).expect("load should succeed");

        // Assert
        assert_eq!(config, ArgonautConfig::default());
    }

    #[test]
    fn test_load_parses_known_fields_and_fills_defaults() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"server":"https://argo.example.com","diff_viewer":"vimdiff {left} {right}"}"#,
        )
        .expect("failed to write config");

        // Act
        let config = ArgonautConfig::load(&path).expect("load should succeed");

        // Assert
        assert_eq!(config.server.as_deref(), Some("https://argo.example.com"));
        assert_eq!(
            config.diff_viewer.as_deref(),
            Some("vimdiff {left} {right}")
        );
        assert!(!config.insecure);
    }

    #[test]
    fn test_load_reports_malformed_json() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").expect("failed to write config");

        // Act
        let result = ArgonautConfig::load(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
