//! FraudGate Runtime - Decision machinery for transfer fraud screening
//!
//! This crate evaluates one transfer at a time:
//! - `limits` and `rules`: dynamic spending limits and the deterministic rule engine
//! - `features`: named feature maps for the anomaly models
//! - `detector`: the isolation forest and autoencoder detectors
//! - `combiner`: fuses rule and detector outputs into a decision
//! - `engine`: runs all of the above for one transfer

pub mod combiner;
pub mod detector;
pub mod engine;
pub mod error;
pub mod features;
pub mod limits;
pub mod observability;
pub mod policy;
pub mod rules;

// Re-export main types
pub use combiner::{DecisionCombiner, ScoreWeights};
pub use detector::{
    AnomalyDetector, AutoencoderDetector, AutoencoderModel, AutoencoderScore, DetectorKind,
    DetectorSignal, ForestDetector, ForestLabel, ForestScore, IsolationForestModel,
};
pub use engine::{Evaluation, HybridEngine};
pub use error::{ModelError, Result, RuntimeError};
pub use features::{FeatureBuilder, FeatureSettings};
pub use limits::{LimitCalculator, SpendingProfile, TypeLimit};
pub use observability::{Metrics, MetricsCollector};
pub use policy::{BeneficiaryPolicy, MonthlyCapPolicy, RulePolicy, TransferTable, VelocityLimit};
pub use rules::{RuleEngine, RuleInput, RuleOutcome};
