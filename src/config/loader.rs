//! Mock file loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::MockFile;
use crate::config::validation::{validate_mock_file, ValidationError};

/// Error type for mock file loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse and validate mock file text.
pub fn parse_mock_file(content: &str) -> Result<MockFile, ConfigError> {
    let file: MockFile = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_mock_file(&file).map_err(ConfigError::Validation)?;
    Ok(file)
}

/// Load and validate a mock file from disk.
pub fn load_mock_file(path: &Path) -> Result<MockFile, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let file = parse_mock_file(&content)?;

    tracing::debug!(path = ?path, mocks = file.mocks.len(), "Mock file loaded");
    Ok(file)
}
