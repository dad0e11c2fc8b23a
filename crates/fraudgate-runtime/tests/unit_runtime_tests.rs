//! Integration tests for fraudgate-runtime
//!
//! Loads model artifacts from disk and runs complete decisions through the
//! hybrid engine.

use fraudgate_core::{
    Advice, CheckKind, ChecksConfig, RiskConfig, RiskLevel, ThresholdEntry, Transaction,
    TransferType, UserStatistics, ViolationKind,
};
use fraudgate_runtime::{
    AutoencoderDetector, DecisionCombiner, FeatureBuilder, ForestDetector, HybridEngine,
    RuleEngine, RulePolicy, RuntimeError,
};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

// ========== Helpers ==========

fn write_artifact(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

/// Forest that isolates transfers above 20000 in one split
fn forest_artifact() -> NamedTempFile {
    let tree = json!({"nodes": [
        {"type": "split", "feature": 0, "threshold": 20000.0, "left": 1, "right": 2},
        {"type": "split", "feature": 1, "threshold": 3.5, "left": 3, "right": 4},
        {"type": "leaf", "samples": 1},
        {"type": "leaf", "samples": 180},
        {"type": "leaf", "samples": 40}
    ]});
    write_artifact(json!({
        "feature_names": ["transaction_amount", "transfer_type_encoded"],
        "max_samples": 256,
        "offset": -0.5,
        "trees": [tree.clone(), tree.clone(), tree]
    }))
}

/// Autoencoder that reconstructs the training mean
fn autoencoder_artifact(threshold: f64) -> NamedTempFile {
    write_artifact(json!({
        "feature_names": ["transaction_amount", "txn_count_10min", "recent_burst"],
        "scaler": {"mean": [4000.0, 1.0, 0.0], "scale": [3000.0, 1.0, 1.0]},
        "layers": [
            {"weights": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]], "bias": [0.0, 0.0], "activation": "relu"},
            {"weights": [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]], "bias": [0.0, 0.0, 0.0], "activation": "linear"}
        ],
        "threshold": threshold
    }))
}

fn full_engine() -> HybridEngine {
    let forest = forest_artifact();
    let ae = autoencoder_artifact(5.0);
    HybridEngine::default()
        .with_detector(ForestDetector::from_file(forest.path()).unwrap())
        .with_detector(AutoencoderDetector::from_file(ae.path()).unwrap())
}

fn autoencoder_only_engine() -> HybridEngine {
    let ae = autoencoder_artifact(5.0);
    HybridEngine::default().with_detector(AutoencoderDetector::from_file(ae.path()).unwrap())
}

fn forest_only_engine() -> HybridEngine {
    let forest = forest_artifact();
    HybridEngine::default().with_detector(ForestDetector::from_file(forest.path()).unwrap())
}

// ========== Scenario Tests ==========

#[test]
fn test_routine_own_account_transfer() {
    let txn = Transaction::new(1000.0, TransferType::OwnAccount).with_velocity(1, 1, 2);
    let result = autoencoder_only_engine()
        .decide(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();

    assert!(!result.is_fraud);
    assert_eq!(result.risk_level, RiskLevel::Safe);
    assert_eq!(result.advice, Advice::Approved);
    assert!(result.reasons.is_empty());
    assert_eq!(result.model_agreement, 0.0);
    assert_eq!(result.confidence_level, 0.95);
    assert!(!result.ae_flag);
    assert!(result.ae_reconstruction_error.is_some());
}

#[test]
fn test_clean_transfer_takes_forest_score() {
    let txn = Transaction::new(1000.0, TransferType::OwnAccount);
    let evaluation = forest_only_engine()
        .evaluate(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    let forest = evaluation.forest.unwrap();
    assert!(!forest.is_anomaly);
    assert_eq!(evaluation.decision.risk_score, forest.normalized_score);
    assert!(!evaluation.decision.is_fraud);
}

#[test]
fn test_large_overseas_transfer_with_forest_flag() {
    let txn = Transaction::new(50000.0, TransferType::Overseas).with_bank_country("UK");
    let evaluation = forest_only_engine()
        .evaluate(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    let result = &evaluation.decision;
    let forest = evaluation.forest.as_ref().unwrap();

    assert!(forest.is_anomaly);
    assert!(result.is_fraud);
    assert!(result.rule_flag);
    assert!(result.ml_flag);
    assert!((result.risk_score - (0.75 + 0.15 * forest.normalized_score)).abs() < 1e-9);
    assert!(result.risk_level >= RiskLevel::Medium);
    assert_eq!(result.advice, Advice::RequiresUserApproval);
    assert_eq!(result.threshold, 9000.0);
    assert!(evaluation.autoencoder.is_none());
    assert_eq!(result.ae_reconstruction_error, None);
}

#[test]
fn test_autoencoder_flags_burst() {
    // amount 22000 -> scaled 6.0, count 10 -> 9.0, burst 1 -> 1.0: error (36 + 81 + 1) / 3
    let txn = Transaction::new(22000.0, TransferType::InternalBank)
        .with_velocity(2, 10, 12)
        .with_time_since_last(20.0);
    let evaluation = full_engine()
        .evaluate(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();

    let ae = evaluation.autoencoder.unwrap();
    assert!((ae.reconstruction_error - 118.0 / 3.0).abs() < 1e-9);
    assert!(ae.is_anomaly);
    assert!(evaluation.decision.ae_flag);
    assert_eq!(evaluation.decision.risk_score, 1.0);
    assert!(evaluation.rules.has(ViolationKind::Velocity10Min));
}

#[test]
fn test_zero_history_customer() {
    let mut stats = UserStatistics::default();
    stats.avg_amount = 0.0;
    stats.std_amount = 0.0;

    let txn = Transaction::new(14000.0, TransferType::OwnAccount);
    let result = HybridEngine::default()
        .decide(&txn, &stats, &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    assert_eq!(result.threshold, 15000.0);
    assert!(!result.rule_flag);
}

// ========== Property Tests ==========

#[test]
fn test_risk_score_bounded_for_all_types() {
    let engine = full_engine();
    for transfer_type in TransferType::ALL {
        for amount in [1.0, 500.0, 9000.0, 25000.0, 1_000_000.0] {
            let txn = Transaction::new(amount, transfer_type)
                .with_velocity(5, 50, 100)
                .with_new_beneficiary(true);
            let result = engine
                .decide(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
                .unwrap();
            assert!((0.0..=1.0).contains(&result.risk_score));
            assert!(result.is_fraud);
            assert_ne!(result.risk_level, RiskLevel::Safe);
        }
    }
}

#[test]
fn test_decision_is_deterministic() {
    let engine = full_engine();
    let txn = Transaction::new(30000.0, TransferType::QuickRemit).with_new_beneficiary(true);
    let stats = UserStatistics::default();
    let first = engine
        .decide(&txn, &stats, &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    let second = engine
        .decide(&txn, &stats, &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_schema_mismatch_is_absent_signal() {
    let forest = write_artifact(json!({
        "feature_names": ["merchant_category"],
        "max_samples": 16,
        "offset": -0.5,
        "trees": [{"nodes": [{"type": "leaf", "samples": 16}]}]
    }));
    let engine = HybridEngine::default().with_detector(ForestDetector::from_file(forest.path()).unwrap());
    let result = engine
        .decide(
            &Transaction::new(100.0, TransferType::OwnAccount),
            &UserStatistics::default(),
            &ChecksConfig::default(),
            &RiskConfig::default(),
        )
        .unwrap();
    assert!(result.ml_score.is_none());
    assert!(!result.is_fraud);
}

#[test]
fn test_checks_toggle_detectors() {
    let checks = ChecksConfig::default().with(CheckKind::IsolationForest, false);
    let result = full_engine()
        .decide(
            &Transaction::new(50000.0, TransferType::Overseas),
            &UserStatistics::default(),
            &checks,
            &RiskConfig::default(),
        )
        .unwrap();
    assert!(result.ml_score.is_none());
    assert!(!result.ml_flag);
    assert!(result.ae_reconstruction_error.is_some());
}

#[test]
fn test_refreshed_thresholds_change_levels() {
    let rows = vec![
        ThresholdEntry::new("IF_Anomaly_High", 0.95),
        ThresholdEntry::new("IF_Anomaly_Medium", 0.9),
        ThresholdEntry::new("IF_Anomaly_Low", 0.8),
    ];
    let strict = RiskConfig::from_thresholds(&rows).unwrap();
    let txn = Transaction::new(10000.0, TransferType::Overseas);

    let engine = HybridEngine::default();
    let default_result = engine
        .decide(&txn, &UserStatistics::default(), &ChecksConfig::default(), &RiskConfig::default())
        .unwrap();
    let strict_result = engine
        .decide(&txn, &UserStatistics::default(), &ChecksConfig::default(), &strict)
        .unwrap();

    assert_eq!(default_result.risk_level, RiskLevel::Medium);
    // 0.75 is below the strict low threshold but the transfer is still flagged
    assert_eq!(strict_result.risk_level, RiskLevel::Low);
}

// ========== Loading Tests ==========

#[test]
fn test_missing_artifact_is_model_error() {
    let err = ForestDetector::from_file("/nonexistent/forest.json").unwrap_err();
    assert!(matches!(err, RuntimeError::Model(_)));
}

#[test]
fn test_policy_from_yaml_file() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "monthly_cap:\n  std_factor: 2.0\n  month_factor: 5.0")?;
    let policy = RulePolicy::from_file(file.path())?;
    let engine = HybridEngine::new(
        RuleEngine::new(policy),
        FeatureBuilder::default(),
        DecisionCombiner::default(),
    );

    // cap = (5000 + 2 * 2000) * 5 = 45000
    let mut stats = UserStatistics::default();
    stats.current_month_spending = 44000.0;
    let result = engine.decide(
        &Transaction::new(2000.0, TransferType::OwnAccount),
        &stats,
        &ChecksConfig::default(),
        &RiskConfig::default(),
    )?;
    assert!(result.violations.iter().any(|v| v.kind == ViolationKind::MonthlySpending));
    assert_eq!(result.risk_score, 0.70);
    Ok(())
}
