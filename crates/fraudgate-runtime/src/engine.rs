//! Hybrid decision engine
//!
//! Runs the rule engine and the enabled detectors for one transfer and hands
//! their outputs to the combiner. Performs no I/O: statistics, checks and
//! risk configuration are resolved by the caller.

use crate::combiner::DecisionCombiner;
use crate::detector::{AnomalyDetector, AutoencoderScore, DetectorKind, DetectorSignal, ForestScore};
use crate::error::Result;
use crate::features::FeatureBuilder;
use crate::observability::Metrics;
use crate::rules::{RuleEngine, RuleInput, RuleOutcome};
use fraudgate_core::{ChecksConfig, DecisionResult, FeatureMap, RiskConfig, Transaction, UserStatistics};
use std::sync::Arc;
use std::time::Instant;

/// Everything the engine computed for one transfer
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub rules: RuleOutcome,
    pub features: FeatureMap,
    pub forest: Option<ForestScore>,
    pub autoencoder: Option<AutoencoderScore>,
    pub decision: DecisionResult,
}

pub struct HybridEngine {
    rules: RuleEngine,
    features: FeatureBuilder,
    detectors: Vec<AnomalyDetector>,
    combiner: DecisionCombiner,
    metrics: Option<Arc<dyn Metrics>>,
}

impl HybridEngine {
    pub fn new(rules: RuleEngine, features: FeatureBuilder, combiner: DecisionCombiner) -> Self {
        Self {
            rules,
            features,
            detectors: Vec::new(),
            combiner,
            metrics: None,
        }
    }

    /// Add a detector, replacing any existing detector of the same kind
    pub fn with_detector(mut self, detector: impl Into<AnomalyDetector>) -> Self {
        let detector = detector.into();
        self.detectors.retain(|d| d.kind() != detector.kind());
        self.detectors.push(detector);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn has_detector(&self, kind: DetectorKind) -> bool {
        self.detectors.iter().any(|d| d.kind() == kind)
    }

    pub fn detector_kinds(&self) -> Vec<DetectorKind> {
        self.detectors.iter().map(|d| d.kind()).collect()
    }

    pub fn decide(
        &self,
        txn: &Transaction,
        stats: &UserStatistics,
        checks: &ChecksConfig,
        risk: &RiskConfig,
    ) -> Result<DecisionResult> {
        Ok(self.evaluate(txn, stats, checks, risk)?.decision)
    }

    /// Full evaluation including intermediate outputs
    pub fn evaluate(
        &self,
        txn: &Transaction,
        stats: &UserStatistics,
        checks: &ChecksConfig,
        risk: &RiskConfig,
    ) -> Result<Evaluation> {
        let started = Instant::now();
        txn.validate()?;

        let rules = self.rules.evaluate(&RuleInput::from_parts(txn, stats), checks);
        let features = self.features.build(txn, stats);

        let mut forest = None;
        let mut autoencoder = None;
        for detector in &self.detectors {
            let kind = detector.kind();
            if !checks.is_enabled(kind.check()) {
                tracing::debug!(detector = %kind, "Detector disabled for this customer");
                continue;
            }
            match detector.detect(&features, risk) {
                Ok(Some(DetectorSignal::Forest(score))) => forest = Some(score),
                Ok(Some(DetectorSignal::Autoencoder(score))) => autoencoder = Some(score),
                Ok(None) => {
                    tracing::debug!(detector = %kind, "Detector produced no signal");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_detector_failure(kind.as_str());
                    }
                }
                Err(e) => {
                    tracing::warn!(detector = %kind, error = %e, "Detector failed, continuing without it");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_detector_failure(kind.as_str());
                    }
                }
            }
        }

        let decision = self
            .combiner
            .combine(&rules, forest.as_ref(), autoencoder.as_ref(), risk);

        tracing::info!(
            transfer_type = %txn.transfer_type,
            amount = txn.amount,
            risk_score = decision.risk_score,
            risk_level = %decision.risk_level,
            is_fraud = decision.is_fraud,
            "Transfer decided"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_decision(decision.risk_level, decision.is_fraud, started.elapsed());
        }

        Ok(Evaluation {
            rules,
            features,
            forest,
            autoencoder,
            decision,
        })
    }
}

impl Default for HybridEngine {
    fn default() -> Self {
        Self::new(
            RuleEngine::default(),
            FeatureBuilder::default(),
            DecisionCombiner::default(),
        )
    }
}
