//! Runtime error types

use fraudgate_core::{CoreError, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or evaluating a model artifact
#[derive(Error, Debug)]
pub enum ModelError {
    /// Artifact file could not be read
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON for the model type
    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact parsed but is structurally unusable
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Input did not match the model's feature schema
    #[error("Feature schema mismatch: {0}")]
    Schema(#[from] SchemaError),
}

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Rule policy failed validation
    #[error("Invalid rule policy: {0}")]
    InvalidPolicy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<SchemaError> for RuntimeError {
    fn from(err: SchemaError) -> Self {
        RuntimeError::Model(ModelError::Schema(err))
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
