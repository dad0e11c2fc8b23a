//! Type definitions for FraudGate
//!
//! This module contains the data model the decision engine consumes and produces:
//! - `transaction`: the inbound transfer and its rolling velocity counters
//! - `statistics`: the customer's historical spending profile
//! - `checks`: per-customer rule and model toggles
//! - `risk`: thresholds, confidence weights and risk levels
//! - `features`: named feature maps and model feature schemas
//! - `violation`: structured rule violations
//! - `decision`: the final verdict

pub mod checks;
pub mod decision;
pub mod features;
pub mod risk;
pub mod statistics;
pub mod transaction;
pub mod violation;

pub use checks::{CheckKind, CheckSetting, ChecksConfig};
pub use decision::{
    Advice, AutoencoderSummary, DecisionResult, ForestSummary, IndividualScores, RuleEngineSummary,
};
pub use features::{FeatureMap, FeatureSchema, SchemaError};
pub use risk::{
    ConfidenceWeights, RiskConfig, RiskLabels, RiskLevel, RiskThresholds, ThresholdEntry,
};
pub use statistics::{UserStatistics, VelocitySnapshot};
pub use transaction::{Transaction, TransferType};
pub use violation::{RuleViolation, ViolationKind};
