use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/intentflow/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("intentflow").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Page size is at least 1
    /// - Event queue capacity is at least 1
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging.page_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "paging.page_size must be at least 1".to_string(),
            });
        }

        if self.events.capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "events.capacity must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::policy::DataSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.paging.page_size, 20);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write(
            r#"
[data_source]
default = "cache_then_network"

[retry]
max_retries = 5
"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.data_source.default, DataSource::CacheThenNetwork);
        assert!(config.data_source.enabled);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.retry_backoff_base_ms, 1000);
        assert_eq!(config.dispatch.debounce_ms, 300);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let file = write("[paging]\npage_size = 0\n");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let file = write("[retry\nmax_retries = 1");
        let err = Config::load_from(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { path, .. } => assert_eq!(path, file.path()),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn data_source_section_builds_runtime_handle() {
        let file = write("[data_source]\ndefault = \"network_only\"\nenabled = false\n");
        let config = Config::load_from(file.path()).unwrap();
        let runtime = config.data_source.to_runtime();
        assert_eq!(runtime.resolve(None), DataSource::LocalFirst);
        runtime.enable_global();
        assert_eq!(runtime.resolve(None), DataSource::NetworkOnly);
    }
}
