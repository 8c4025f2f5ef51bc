//! Error types for Horizon Arbor.
//!
//! Interactive operations on the engine never fail: input whose preconditions
//! are not met is ignored. Only the data and configuration boundaries return
//! errors.

use std::path::PathBuf;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that can occur when loading node data or configuration.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A node forest could not be parsed from JSON.
    #[error("Invalid node data: {0}")]
    NodeData(#[from] serde_json::Error),

    /// A configuration document could not be parsed.
    #[error("Invalid tree configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
