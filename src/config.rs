//! Configuration file handling.
//!
//! Settings come from an optional `sleep-report.toml`; command-line flags
//! override whatever the file sets.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "sleep-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Input source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Tabular source (.csv, .json or .parquet).
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Substitute the built-in fixture when the source cannot be loaded.
    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            fallback: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("Sleep_health_and_lifestyle_dataset.csv")
}

fn default_true() -> bool {
    true
}

/// Output format of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text tables
    #[default]
    Text,
    /// JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Append narrative key findings.
    #[serde(default = "default_true")]
    pub findings: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            findings: true,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.data.fallback);
        assert_eq!(config.report.format, OutputFormat::Text);
    }

    #[test]
    fn parses_all_sections() {
        let config: Config = toml::from_str(
            r#"
            [data]
            path = "data/sleep.parquet"
            fallback = false

            [report]
            format = "json"
            findings = false
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/sleep.parquet"));
        assert!(!config.data.fallback);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.report.findings);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[data\npath = 3").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
