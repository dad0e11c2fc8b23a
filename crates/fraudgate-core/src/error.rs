//! Error types for FraudGate Core

use crate::types::SchemaError;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unknown transfer type: {0}")]
    UnknownTransferType(String),

    #[error("Invalid threshold configuration: {0}")]
    InvalidThreshold(String),

    #[error("Feature schema error: {0}")]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
