//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, "[sites]\nenvironments = [\"prod\"]\nenvironment = \"prod\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sites.environments, ["prod"]);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, "[sites]\nenvironments = [\"prod\"]\nenvironment = \"dev\"\nurl_scheme = \"ftp\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("`dev`"));
        assert!(message.contains("`ftp`"));
    }

    #[test]
    fn test_parse_and_io_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load_config(&dir.path().join("missing.toml")), Err(ConfigError::Io(_))));

        let path = dir.path().join("broken.toml");
        fs::write(&path, "[sites").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
