//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Core error
    #[error("Core error: {0}")]
    CoreError(#[from] fraudgate_core::CoreError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] fraudgate_runtime::RuntimeError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Transfer request failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A collaborator returned an error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// A collaborator required for a safe decision is down
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl SdkError {
    /// HTTP status a transport layer should map this error to
    pub fn status_code(&self) -> u16 {
        match self {
            SdkError::InvalidRequest(_) => 400,
            SdkError::CoreError(fraudgate_core::CoreError::InvalidValue(_))
            | SdkError::CoreError(fraudgate_core::CoreError::UnknownTransferType(_)) => 400,
            SdkError::ServiceUnavailable(_) => 503,
            _ => 500,
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
