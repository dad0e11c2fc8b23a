//! Unit tests for FraudGate core types
//!
//! Tests the data model as it arrives from external stores: statistics maps,
//! check rows and threshold rows.

use fraudgate_core::types::{Advice, CheckKind, CheckSetting, ChecksConfig, RiskConfig};
use fraudgate_core::{
    CoreError, FeatureMap, FeatureSchema, RiskLevel, ThresholdEntry, Transaction, TransferType,
    UserStatistics,
};
use std::collections::HashMap;

// =============================================================================
// Statistics Tests
// =============================================================================

#[test]
fn test_statistics_from_store_row() {
    let row: HashMap<String, f64> = [
        ("user_avg_amount", 3200.0),
        ("user_std_amount", 900.0),
        ("user_max_amount", 8000.0),
        ("user_txn_frequency", 87.0),
        ("user_international_ratio", 0.1),
        ("current_month_spending", 12000.0),
        ("user_monthly_txn_count", 6.0),
        ("user_monthly_avg_amount", 2000.0),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let stats = UserStatistics::from_map(&row);
    assert_eq!(stats.avg_amount, 3200.0);
    assert_eq!(stats.std_amount, 900.0);
    assert_eq!(stats.txn_frequency, 87);
    assert_eq!(stats.current_month_spending, 12000.0);
    assert_eq!(stats.effective_monthly_avg(), 2000.0);
}

#[test]
fn test_statistics_empty_row_uses_default_profile() {
    let stats = UserStatistics::from_map(&HashMap::new());
    assert_eq!(stats, UserStatistics::default());
}

// =============================================================================
// Checks Tests
// =============================================================================

#[test]
fn test_checks_from_json_rows() -> anyhow::Result<()> {
    let rows: Vec<CheckSetting> = serde_json::from_str(
        r#"[
            {"parameter_name": "velocity_check_10min", "is_enabled": false},
            {"parameter_name": "isolation_forest_check", "is_enabled": false, "is_active": true},
            {"parameter_name": "autoencoder_check", "is_enabled": false, "is_active": false}
        ]"#,
    )?;

    let checks = ChecksConfig::from_settings(&rows);
    assert!(!checks.is_enabled(CheckKind::Velocity10Min));
    assert!(!checks.is_enabled(CheckKind::IsolationForest));
    assert!(checks.is_enabled(CheckKind::Autoencoder));
    assert!(checks.is_enabled(CheckKind::MonthlySpending));
    Ok(())
}

#[test]
fn test_checks_builder_toggle() {
    let checks = ChecksConfig::default().with(CheckKind::NewBeneficiary, false);
    assert!(!checks.new_beneficiary);
    assert!(checks.velocity_1hour);
}

// =============================================================================
// Risk Config Tests
// =============================================================================

#[test]
fn test_risk_config_from_store_rows() -> anyhow::Result<()> {
    let rows: Vec<ThresholdEntry> = serde_json::from_str(
        r#"[
            {"name": "IF_Anomaly_High", "value": 0.8, "min_value": 0.5, "max_value": 1.0},
            {"name": "IF_Anomaly_Medium", "value": 0.6},
            {"name": "IF_Anomaly_Low", "value": 0.4},
            {"name": "Confidence_AllAgree", "value": 0.99},
            {"name": "Confidence_TwoAgree", "value": 1.7, "max_value": 1.0}
        ]"#,
    )?;

    let config = RiskConfig::from_thresholds(&rows)?;
    assert_eq!(config.thresholds.high, 0.8);
    assert_eq!(config.thresholds.medium, 0.6);
    assert_eq!(config.thresholds.low, 0.4);
    assert_eq!(config.confidence.all_agree, 0.99);
    // rejected row keeps the default
    assert_eq!(config.confidence.two_agree, 0.75);

    assert_eq!(config.level_for(0.82), RiskLevel::High);
    assert_eq!(config.level_for(0.41), RiskLevel::Low);
    Ok(())
}

#[test]
fn test_risk_config_rejects_out_of_range() {
    let config = RiskConfig {
        thresholds: fraudgate_core::RiskThresholds {
            high: 1.5,
            medium: 0.65,
            low: 0.45,
        },
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(CoreError::InvalidThreshold(_))));
}

#[test]
fn test_advice_follows_level() {
    let config = RiskConfig::default();
    assert_eq!(Advice::for_level(config.level_for(0.95)), Advice::RequiresUserApproval);
    assert_eq!(Advice::for_level(config.level_for(0.5)), Advice::ApprovedWithNotification);
    assert_eq!(Advice::for_level(config.level_for(0.0)), Advice::Approved);
}

// =============================================================================
// Transaction and Feature Tests
// =============================================================================

#[test]
fn test_transaction_deserializes_transfer_code() -> anyhow::Result<()> {
    let txn: Transaction = serde_json::from_str(
        r#"{
            "amount": 750.0,
            "transfer_type": "M",
            "bank_country": "UAE",
            "txn_count_30s": 1,
            "txn_count_10min": 2,
            "txn_count_1hour": 3,
            "time_since_last_txn": 120.0
        }"#,
    )?;
    assert_eq!(txn.transfer_type, TransferType::MobilePay);
    assert_eq!(txn.is_new_beneficiary, None);
    assert!(txn.initiated_at.is_none());
    Ok(())
}

#[test]
fn test_schema_error_converts_into_core_error() {
    let schema = FeatureSchema::new("forest", vec!["amount".to_string()]).unwrap();
    let result: Result<Vec<f64>, CoreError> = schema.project(&FeatureMap::new()).map_err(Into::into);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Missing feature 'amount'"));
}
