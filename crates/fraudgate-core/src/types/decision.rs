//! Decision result types

use super::risk::RiskLevel;
use super::violation::RuleViolation;
use serde::{Deserialize, Serialize};

/// What the channel should do with the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advice {
    Approved,
    ApprovedWithNotification,
    RequiresUserApproval,
}

impl Advice {
    /// Advice is a pure function of the risk level
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High | RiskLevel::Medium => Advice::RequiresUserApproval,
            RiskLevel::Low => Advice::ApprovedWithNotification,
            RiskLevel::Safe => Advice::Approved,
        }
    }

    pub fn requires_approval(&self) -> bool {
        matches!(self, Advice::RequiresUserApproval)
    }
}

/// Final verdict for one transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub is_fraud: bool,

    /// Combined score in [0, 1]
    pub risk_score: f64,

    pub risk_level: RiskLevel,

    /// Configured display label for `risk_level`
    pub risk_label: String,

    /// Confidence in [0, 1], rounded to 2 decimals
    pub confidence_level: f64,

    /// Share of detectors that flagged the transfer (0, 0.33, 0.67 or 1)
    pub model_agreement: f64,

    /// Ordered human-readable reasons
    pub reasons: Vec<String>,

    /// Structured rule violations behind the rule reasons
    pub violations: Vec<RuleViolation>,

    /// Amount limit applied to this transfer type
    pub threshold: f64,

    pub rule_flag: bool,

    pub ml_flag: bool,
    pub ml_score: Option<f64>,
    pub ml_raw_score: Option<f64>,
    pub ml_threshold: f64,

    pub ae_flag: bool,
    pub ae_reconstruction_error: Option<f64>,
    pub ae_threshold: Option<f64>,

    pub advice: Advice,
}

impl DecisionResult {
    /// Number of detectors that flagged the transfer
    pub fn flag_count(&self) -> usize {
        [self.rule_flag, self.ml_flag, self.ae_flag]
            .iter()
            .filter(|flag| **flag)
            .count()
    }

    /// Per-detector breakdown for audit output
    pub fn individual_scores(&self) -> IndividualScores {
        IndividualScores {
            rule_engine: RuleEngineSummary {
                violated: self.rule_flag,
                threshold: self.threshold,
            },
            isolation_forest: self.ml_score.map(|score| ForestSummary {
                anomaly_score: score,
                raw_score: self.ml_raw_score.unwrap_or_default(),
                threshold: self.ml_threshold,
                is_anomaly: self.ml_flag,
            }),
            autoencoder: match (self.ae_reconstruction_error, self.ae_threshold) {
                (Some(error), Some(threshold)) => Some(AutoencoderSummary {
                    reconstruction_error: error,
                    threshold,
                    is_anomaly: self.ae_flag,
                }),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEngineSummary {
    pub violated: bool,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSummary {
    pub anomaly_score: f64,
    pub raw_score: f64,
    pub threshold: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderSummary {
    pub reconstruction_error: f64,
    pub threshold: f64,
    pub is_anomaly: bool,
}

/// Per-detector scores. Absent detectors serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualScores {
    pub rule_engine: RuleEngineSummary,
    pub isolation_forest: Option<ForestSummary>,
    pub autoencoder: Option<AutoencoderSummary>,
}
