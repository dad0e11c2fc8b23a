//! FraudGate Core - Core types and definitions for the FraudGate decision engine
//!
//! This crate provides the fundamental types shared across the FraudGate crates:
//! - Transfer requests and customer statistics snapshots
//! - Per-customer check toggles and risk configuration
//! - Named feature maps and the schemas models are trained against
//! - The final decision result and its audit breakdown
//! - Error types

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use types::{
    Advice, AutoencoderSummary, CheckKind, CheckSetting, ChecksConfig, ConfidenceWeights,
    DecisionResult, FeatureMap, FeatureSchema, ForestSummary, IndividualScores, RiskConfig,
    RiskLabels, RiskLevel, RiskThresholds, RuleEngineSummary, RuleViolation, SchemaError,
    ThresholdEntry, Transaction, TransferType, UserStatistics, VelocitySnapshot, ViolationKind,
};
