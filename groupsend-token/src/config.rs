//! Verifier policy configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("serialize error: {0}")]
    SerializeError(String),
}

/// Policy applied by [`crate::TokenVerifier`] on top of the tag check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Reject tokens whose expiration is not after the current time
    #[serde(default = "default_enforce_expiration")]
    pub enforce_expiration: bool,

    /// Reject tokens expiring further than this many seconds after the current time
    #[serde(default)]
    pub max_token_lifetime_secs: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enforce_expiration: default_enforce_expiration(),
            max_token_lifetime_secs: None,
        }
    }
}

fn default_enforce_expiration() -> bool {
    true
}

impl VerifierConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Policy without the expiry check; the tag is still verified.
    pub fn without_expiry_check() -> Self {
        Self {
            enforce_expiration: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = VerifierConfig::default();
        assert!(config.enforce_expiration);
        assert_eq!(config.max_token_lifetime_secs, None);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = VerifierConfig::from_toml_str("").unwrap();
        assert_eq!(config, VerifierConfig::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
enforce_expiration = false
max_token_lifetime_secs = 604800
"#;
        let config = VerifierConfig::from_toml_str(toml).unwrap();
        assert!(!config.enforce_expiration);
        assert_eq!(config.max_token_lifetime_secs, Some(604_800));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = VerifierConfig::from_toml_str("enforce_expiration = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("verifier.toml");

        let config = VerifierConfig {
            enforce_expiration: true,
            max_token_lifetime_secs: Some(86_400),
        };
        config.to_file(&path).unwrap();

        let loaded = VerifierConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = VerifierConfig::from_file(temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
