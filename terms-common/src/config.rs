//! Configuration loading and resolution
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and the
//! remaining sources are used. A config file that exists but does not parse
//! is an [`Error::Config`].

use crate::reconcile::DEFAULT_COLLECTION;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overrides the config file location
pub const ENV_CONFIG: &str = "TERMS_CONFIG";
/// Overrides the SQLite database path
pub const ENV_DATABASE: &str = "TERMS_DATABASE";
/// Overrides the collection name
pub const ENV_COLLECTION: &str = "TERMS_COLLECTION";
/// Overrides the dump directory
pub const ENV_DUMP_DIR: &str = "TERMS_DUMP_DIR";

/// Settings file contents
///
/// Every field is optional; absent fields fall through to the compiled
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to the SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Collection the term documents live in
    #[serde(default)]
    pub collection: Option<String>,

    /// Directory that `terms create` dumps batches into
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub collection: Option<String>,
    pub dump_dir: Option<PathBuf>,
}

/// Final settings after applying the priority order
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub database_path: PathBuf,
    pub collection: String,
    pub dump_dir: PathBuf,
    pub log_level: String,
    /// Config file that was actually read, if any
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = overrides
            .config_path
            .clone()
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from))
            .or_else(default_config_path);

        let (toml_config, config_file) = match config_path {
            Some(path) => match load_toml_config(&path)? {
                Some(config) => (config, Some(path)),
                None => (TomlConfig::default(), None),
            },
            None => {
                warn!("Could not determine config directory; using defaults");
                (TomlConfig::default(), None)
            }
        };

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
            .or(toml_config.database_path)
            .unwrap_or_else(default_database_path);

        let collection = overrides
            .collection
            .clone()
            .or_else(|| env_value(ENV_COLLECTION))
            .or(toml_config.collection)
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        if collection.trim().is_empty() {
            return Err(Error::Config("collection name must not be empty".to_string()));
        }

        let dump_dir = overrides
            .dump_dir
            .clone()
            .or_else(|| env_value(ENV_DUMP_DIR).map(PathBuf::from))
            .or(toml_config.dump_dir)
            .unwrap_or_else(default_dump_dir);

        let resolved = Self {
            database_path,
            collection,
            dump_dir,
            log_level: toml_config.logging.level,
            config_file,
        };
        debug!("Resolved configuration: {:?}", resolved);
        Ok(resolved)
    }
}

/// Environment variable value, with empty strings treated as unset
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a TOML config file
///
/// # Returns
/// * `Ok(None)` - The file does not exist (warning logged)
/// * `Err(Error::Config)` - The file exists but is unreadable or malformed
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    debug!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// `<config_dir>/terms/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("terms").join("config.toml"))
}

/// `<data_local_dir>/terms/terms.db`, or `./terms.db` when the platform has none
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("terms").join("terms.db"))
        .unwrap_or_else(|| PathBuf::from("terms.db"))
}

pub fn default_dump_dir() -> PathBuf {
    PathBuf::from("dumps")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_config_all_fields() {
        let config: TomlConfig = toml::from_str(
            r#"
            database_path = "/srv/terms/terms.db"
            collection = "staging"
            dump_dir = "/srv/terms/dumps"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("/srv/terms/terms.db")));
        assert_eq!(config.collection.as_deref(), Some("staging"));
        assert_eq!(config.dump_dir, Some(PathBuf::from("/srv/terms/dumps")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_toml_config_empty_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_logging_section_without_level() {
        let config: TomlConfig = toml::from_str("[logging]\n").unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_paths() {
        assert!(default_database_path().ends_with("terms.db"));
        assert_eq!(default_dump_dir(), PathBuf::from("dumps"));
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("terms/config.toml"));
        }
    }
}
