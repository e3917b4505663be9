//! Error types for deploy-forge.
//!
//! Fatal conditions only. Problems found *in* generated manifests are reported
//! as [`Finding`](crate::analyzer::Finding)s, never as errors.

use thiserror::Error;

/// Top-level error for rendering, analysis and the CLI.
#[derive(Debug, Error)]
pub enum DeployForgeError {
    /// Component type is not in the catalog.
    #[error("Unknown component type '{0}'")]
    UnknownComponent(String),

    /// An override value is out of bounds or has the wrong shape.
    #[error("Invalid override '{field}': {reason}")]
    InvalidOverride { field: String, reason: String },

    /// A derived Kubernetes name would exceed the DNS-1123 label limit.
    #[error("Name '{name}' is {length} characters long (max 63)")]
    NameTooLong { name: String, length: usize },

    /// A name contains characters that are not allowed in a DNS-1123 label.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A document could not be parsed as YAML.
    #[error("Malformed document '{document}': {reason}")]
    MalformedDocument { document: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParsingFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl From<serde_yaml::Error> for DeployForgeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DeployForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeployForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = DeployForgeError::NameTooLong {
            name: "a-very-long-name-deployment".to_string(),
            length: 70,
        };
        assert!(err.to_string().contains("a-very-long-name-deployment"));
        assert!(err.to_string().contains("70"));

        let err = DeployForgeError::InvalidOverride {
            field: "replicas".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid override 'replicas': must be at least 1"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: DeployForgeError = ConfigError::ParsingFailed("bad toml".to_string()).into();
        assert!(matches!(err, DeployForgeError::Config(_)));
    }
}
