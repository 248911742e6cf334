//! Host configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use hybrid_search::HybridSearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{JobtrackerError, Result};

/// Top-level configuration for the jobtracker search host.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```toml
/// database_path = "/var/lib/jobtracker/jobs.db"
///
/// [search]
/// semantic_url = "http://ai-service:5000"
/// top_k = 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database holding the job listings.
    pub database_path: PathBuf,
    /// Maximum rows returned by one keyword search.
    pub lexical_limit: usize,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Hybrid ranking settings.
    pub search: HybridSearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            lexical_limit: 200,
            log_filter: "jobtracker=info,hybrid_search=info".into(),
            search: HybridSearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| JobtrackerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| JobtrackerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate host and search settings.
    ///
    /// # Errors
    ///
    /// Returns [`JobtrackerError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.lexical_limit == 0 {
            return Err(JobtrackerError::Config(
                "lexical_limit must be greater than 0".into(),
            ));
        }
        self.search
            .validate()
            .map_err(|e| JobtrackerError::Config(e.to_string()))
    }

    /// Returns the default config file path: `<config dir>/jobtracker/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("jobtracker")
            .join("config.toml")
    }
}

/// Returns the default database path: `<data dir>/jobtracker/jobs.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("jobtracker")
        .join("jobs.db")
}
