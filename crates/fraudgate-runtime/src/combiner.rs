//! Decision combiner
//!
//! Fuses the rule outcome and the two detector outputs into a single
//! [`DecisionResult`]. Stateless: the same inputs always give the same result.

use crate::detector::{AutoencoderScore, ForestScore};
use crate::rules::RuleOutcome;
use fraudgate_core::{Advice, DecisionResult, RiskConfig, RiskLevel, ViolationKind};
use serde::{Deserialize, Serialize};

/// Score contributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Base score when a velocity rule fired
    pub velocity_base: f64,
    pub monthly_spending_base: f64,
    pub new_beneficiary_base: f64,
    /// Base score for any other rule violation
    pub other_base: f64,

    /// Share of the forest score added on top of a rule violation
    pub forest_weight: f64,

    /// Share of the reconstruction error added when the autoencoder flags
    pub autoencoder_weight: f64,

    /// Risk score above which a forest flag earns the confidence boost
    pub boost_min_score: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            velocity_base: 0.85,
            monthly_spending_base: 0.70,
            new_beneficiary_base: 0.60,
            other_base: 0.75,
            forest_weight: 0.15,
            autoencoder_weight: 0.10,
            boost_min_score: 0.8,
        }
    }
}

impl ScoreWeights {
    /// Base score for a set of violations, by precedence:
    /// velocity, then monthly spending, then new beneficiary.
    pub fn base_score<I>(&self, kinds: I) -> Option<f64>
    where
        I: IntoIterator<Item = ViolationKind>,
    {
        let mut any = false;
        let mut velocity = false;
        let mut monthly = false;
        let mut beneficiary = false;
        for kind in kinds {
            any = true;
            match kind {
                ViolationKind::Velocity10Min | ViolationKind::Velocity1Hour => velocity = true,
                ViolationKind::MonthlySpending => monthly = true,
                ViolationKind::NewBeneficiary => beneficiary = true,
                ViolationKind::AmountLimit => {}
            }
        }

        if !any {
            None
        } else if velocity {
            Some(self.velocity_base)
        } else if monthly {
            Some(self.monthly_spending_base)
        } else if beneficiary {
            Some(self.new_beneficiary_base)
        } else {
            Some(self.other_base)
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default)]
pub struct DecisionCombiner {
    weights: ScoreWeights,
}

impl DecisionCombiner {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn combine(
        &self,
        rules: &RuleOutcome,
        forest: Option<&ForestScore>,
        autoencoder: Option<&AutoencoderScore>,
        risk: &RiskConfig,
    ) -> DecisionResult {
        let mut reasons: Vec<String> = rules.reasons().map(str::to_string).collect();
        let rule_flag = rules.violated;

        let mut score = if rule_flag {
            self.weights
                .base_score(rules.violations.iter().map(|v| v.kind))
                .unwrap_or(self.weights.other_base)
        } else {
            0.0
        };

        let mut ml_flag = false;
        if let Some(forest) = forest {
            if rule_flag {
                score += forest.normalized_score * self.weights.forest_weight;
            } else {
                score = forest.normalized_score;
            }
            if forest.is_anomaly {
                ml_flag = true;
                if let Some(reason) = &forest.reason {
                    reasons.push(reason.clone());
                }
            }
        }

        let mut ae_flag = false;
        if let Some(ae) = autoencoder {
            if ae.is_anomaly {
                ae_flag = true;
                score += ae.reconstruction_error * self.weights.autoencoder_weight;
                if let Some(reason) = &ae.reason {
                    reasons.push(reason.clone());
                }
            }
        }

        let risk_score = if score.is_nan() { 1.0 } else { score.clamp(0.0, 1.0) };
        let is_fraud = rule_flag || ml_flag || ae_flag;

        let mut risk_level = risk.level_for(risk_score);
        if is_fraud && risk_level == RiskLevel::Safe {
            risk_level = RiskLevel::Low;
        }

        let flags = [rule_flag, ml_flag, ae_flag].iter().filter(|f| **f).count();
        let confidence = &risk.confidence;
        let mut confidence_level = match flags {
            3 | 0 => confidence.all_agree,
            2 => confidence.two_agree,
            _ => confidence.one_agrees,
        };
        if ml_flag && risk_score > self.weights.boost_min_score {
            confidence_level += confidence.high_risk_boost;
        }

        DecisionResult {
            is_fraud,
            risk_score,
            risk_level,
            risk_label: risk.label(risk_level).to_string(),
            confidence_level: round2(confidence_level.min(1.0)),
            model_agreement: round2(flags as f64 / 3.0),
            reasons,
            violations: rules.violations.clone(),
            threshold: rules.threshold,
            rule_flag,
            ml_flag,
            ml_score: forest.map(|f| f.normalized_score),
            ml_raw_score: forest.map(|f| f.raw_score),
            ml_threshold: risk.thresholds.medium,
            ae_flag,
            ae_reconstruction_error: autoencoder.map(|a| a.reconstruction_error),
            ae_threshold: autoencoder.map(|a| a.threshold),
            advice: Advice::for_level(risk_level),
        }
    }
}
