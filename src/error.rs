//! Error types for the roadmap crate
//!
//! The engine itself is infallible; errors only arise at the edges
//! (loading configuration, fetching systems and obligations).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the roadmap crate
#[derive(Error, Debug)]
pub enum RoadmapError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to fetch AI systems or obligations from a data source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RoadmapError>;
