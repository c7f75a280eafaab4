use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::source::{CsvFiles, Relations};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Restrict pressure readings to QC-approved rows.
    #[serde(default = "default_require_qc")]
    pub require_qc: bool,
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            require_qc: true,
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Csv {
        directory: PathBuf,
        #[serde(default)]
        files: CsvFiles,
    },
    Postgres {
        #[serde(default)]
        database_url: Option<String>,
        #[serde(default)]
        relations: Relations,
    },
}

fn default_require_qc() -> bool {
    true
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ExportConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.source {
            Some(SourceConfig::Csv { directory, .. }) if directory.as_os_str().is_empty() => Err(
                ConfigError::Invalid("csv source requires a directory".to_string()),
            ),
            Some(SourceConfig::Postgres { relations, .. }) => relations
                .validate()
                .map_err(|err| ConfigError::Invalid(err.to_string())),
            _ => Ok(()),
        }
    }
}
