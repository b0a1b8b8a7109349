//! Optional settings file for `tax-estimator`.
//!
//! ```toml
//! tax_year = 2024
//! tables_dir = "/etc/tax-estimator/tables"
//! log_level = "info"
//! log_file = "/var/log/tax-estimator.log"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::logging::DEFAULT_LOG_LEVEL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Table year; the latest built-in year when unset.
    pub tax_year: Option<i32>,
    /// Directory of rate-table CSVs replacing the built-in tables.
    pub tables_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fills every unset field from `other`. Used to lay flags over the file.
    pub fn or(
        self,
        other: CliConfig,
    ) -> CliConfig {
        CliConfig {
            tax_year: self.tax_year.or(other.tax_year),
            tables_dir: self.tables_dir.or(other.tables_dir),
            log_level: self.log_level.or(other.log_level),
            log_file: self.log_file.or(other.log_file),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();

        assert_eq!(config, CliConfig::default());
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn every_key_parses() {
        let config = CliConfig::from_toml_str(
            r#"
tax_year = 2024
tables_dir = "tables"
log_level = "debug"
log_file = "run.log"
"#,
        )
        .unwrap();

        assert_eq!(
            config,
            CliConfig {
                tax_year: Some(2024),
                tables_dir: Some(PathBuf::from("tables")),
                log_level: Some("debug".to_string()),
                log_file: Some(PathBuf::from("run.log")),
            }
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(CliConfig::from_toml_str("year = 2024").is_err());
    }

    #[test]
    fn flags_override_file() {
        let file = CliConfig {
            tax_year: Some(2024),
            log_level: Some("info".to_string()),
            ..CliConfig::default()
        };
        let flags = CliConfig {
            tax_year: Some(2025),
            ..CliConfig::default()
        };

        let merged = flags.or(file);

        assert_eq!(merged.tax_year, Some(2025));
        assert_eq!(merged.log_level(), "info");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = CliConfig::load(Path::new("/nonexistent/tax-estimator.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
