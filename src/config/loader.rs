use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConventionConfig;

/// Errors that can occur when loading convention configuration.
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

impl ConventionConfig {
    /// Loads convention configuration from a TOML file.
    ///
    /// Missing keys fall back to the built-in defaults; the parsed result
    /// is validated before it is returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: ConventionConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("conventions.toml");
        let mut file = fs::File::create(&path).expect("create config");
        file.write_all(content.as_bytes()).expect("write config");
        (dir, path)
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let (_dir, path) = write_config("view_suffixes = [\"Page\"]\n");
        let config = ConventionConfig::load_from(&path).expect("load");

        assert_eq!(config.view_suffixes, vec!["Page"]);
        assert_eq!(config.templates.len(), 2);
        assert!(config.default_namespaces.is_empty());
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let (_dir, path) = write_config("templates = [\"{namespace}::Fixed\"]\n");
        let err = ConventionConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn unreadable_file_reports_read_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("missing.toml");
        let err = ConventionConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn default_config_validates() {
        assert!(ConventionConfig::default().validate().is_ok());
    }
}
