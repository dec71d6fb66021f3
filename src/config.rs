use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config directory")]
    NoConfigDir,

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Term validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Text correction settings
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Lexicon store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Warn about substring conflicts between terms (slow on bulk imports)
    #[serde(default = "default_true")]
    pub check_conflicts: bool,

    #[serde(default = "default_min_length")]
    pub term_min_length: usize,

    #[serde(default = "default_term_max_length")]
    pub term_max_length: usize,

    #[serde(default = "default_min_length")]
    pub replacement_min_length: usize,

    #[serde(default = "default_replacement_max_length")]
    pub replacement_max_length: usize,

    /// Largest batch accepted by a bulk import
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_conflicts: true,
            term_min_length: default_min_length(),
            term_max_length: default_term_max_length(),
            replacement_min_length: default_min_length(),
            replacement_max_length: default_replacement_max_length(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionConfig {
    /// Apply lexicon corrections to text (disabled = pass-through)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Path to the lexicon file (default: <data dir>/lexicon.toml)
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
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

fn default_true() -> bool {
    true
}

fn default_min_length() -> usize {
    1
}

fn default_term_max_length() -> usize {
    200
}

fn default_replacement_max_length() -> usize {
    500
}

fn default_max_batch_size() -> usize {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("com", "lexicorrect", "lexicorrect")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the data directory path (for the lexicon store)
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("com", "lexicorrect", "lexicorrect")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, or defaults if it does not exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file not found, using defaults: {}", path.display());
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.validation;

        if v.term_min_length == 0 || v.replacement_min_length == 0 {
            return Err(ConfigError::ValidationError(
                "minimum lengths must be at least 1".into(),
            ));
        }

        if v.term_min_length > v.term_max_length {
            return Err(ConfigError::ValidationError(
                "term_min_length cannot exceed term_max_length".into(),
            ));
        }

        if v.replacement_min_length > v.replacement_max_length {
            return Err(ConfigError::ValidationError(
                "replacement_min_length cannot exceed replacement_max_length".into(),
            ));
        }

        if v.max_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_batch_size must be positive".into(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        // Validate store path if specified
        if let Some(ref path) = self.store.path {
            if path.contains("..") {
                return Err(ConfigError::ValidationError(
                    "store path contains path traversal sequence (..)".into(),
                ));
            }
            let store_path = PathBuf::from(path);
            if store_path.exists() && !store_path.is_file() {
                return Err(ConfigError::ValidationError(
                    "store path must point to a file".into(),
                ));
            }
        }

        Ok(())
    }

    /// Effective lexicon store path
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        match self.store.path {
            Some(ref path) => Ok(PathBuf::from(path)),
            None => Ok(Self::data_dir()?.join("lexicon.toml")),
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        info!("Config saved to: {}", path.display());
        Ok(())
    }
}

/// Render the configuration as TOML
pub fn show(config: &Config) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ===================
    // Default Value Tests
    // ===================

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validation.check_conflicts);
        assert_eq!(config.validation.term_min_length, 1);
        assert_eq!(config.validation.term_max_length, 200);
        assert_eq!(config.validation.replacement_min_length, 1);
        assert_eq!(config.validation.replacement_max_length, 500);
        assert_eq!(config.validation.max_batch_size, 10_000);
        assert!(config.correction.enabled);
        assert!(config.store.path.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    // ===================
    // Validation Tests
    // ===================

    #[test]
    fn test_validate_min_exceeds_max() {
        let mut config = Config::default();
        config.validation.term_min_length = 300;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.replacement_min_length = 501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_minimum() {
        let mut config = Config::default();
        config.validation.term_min_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.validation.max_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".into();
        assert!(config.validate().is_ok());
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_store_path_traversal() {
        let mut config = Config::default();
        config.store.path = Some("../../etc/passwd".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("path traversal"));
    }

    #[test]
    fn test_validate_store_path_directory() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.store.path = Some(dir.path().to_string_lossy().into_owned());
        assert!(config.validate().is_err());
    }

    // ===================
    // Parsing Tests
    // ===================

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.validation.check_conflicts);
        assert_eq!(config.validation.term_max_length, 200);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
[validation]
check_conflicts = false
term_max_length = 120

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert!(!config.validation.check_conflicts);
        assert_eq!(config.validation.term_max_length, 120);
        assert_eq!(config.validation.replacement_max_length, 500);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_store_path_override() {
        let mut config = Config::default();
        config.store.path = Some("/tmp/lexicon.toml".into());
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/tmp/lexicon.toml")
        );
    }

    // ===================
    // File Tests
    // ===================

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.validation.check_conflicts = false;
        config.correction.enabled = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.validation.check_conflicts);
        assert!(!loaded.correction.enabled);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[validation]\nmax_batch_size = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[validation\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_show_renders_sections() {
        let rendered = show(&Config::default()).unwrap();
        assert!(rendered.contains("[validation]"));
        assert!(rendered.contains("check_conflicts = true"));
    }
}
