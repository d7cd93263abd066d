//! Error types for Tessera

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TesseraError
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Main error type for Tessera core operations
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workspace graph errors
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Workspace graph construction errors
///
/// These are fatal configuration errors: a graph that fails to build is never
/// handed to the task layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Adding an edge would close a dependency cycle
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// An edge referenced a node that was never added
    #[error("Workspace '{0}' is not part of the workspace graph")]
    UnknownNode(String),

    /// Two workspaces share one name
    #[error("Duplicate workspace name: {0}")]
    DuplicateWorkspace(String),
}
