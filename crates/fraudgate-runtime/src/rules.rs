//! Deterministic rule engine
//!
//! Evaluates the amount limit, velocity windows, monthly cap and
//! new-beneficiary rules. Every enabled rule runs; violations accumulate in
//! evaluation order.

use crate::limits::LimitCalculator;
use crate::policy::RulePolicy;
use fraudgate_core::{
    ChecksConfig, CheckKind, RuleViolation, Transaction, TransferType, UserStatistics,
    ViolationKind,
};
use serde::Serialize;

/// Inputs the rule engine needs for one transfer
#[derive(Debug, Clone, PartialEq)]
pub struct RuleInput {
    pub amount: f64,
    pub transfer_type: TransferType,
    pub txn_count_10min: u32,
    pub txn_count_1hour: u32,
    pub monthly_spending: f64,
    pub is_new_beneficiary: bool,
    pub user_avg: f64,
    pub user_std: f64,
}

impl RuleInput {
    pub fn from_parts(txn: &Transaction, stats: &UserStatistics) -> Self {
        Self {
            amount: txn.amount,
            transfer_type: txn.transfer_type,
            txn_count_10min: txn.txn_count_10min,
            txn_count_1hour: txn.txn_count_1hour,
            monthly_spending: stats.current_month_spending,
            is_new_beneficiary: txn.has_new_beneficiary(),
            user_avg: stats.avg_amount,
            user_std: stats.std_amount,
        }
    }
}

/// Result of rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    pub violated: bool,
    pub violations: Vec<RuleViolation>,
    /// Amount limit for the transfer type, reported even when nothing fired
    pub threshold: f64,
}

impl RuleOutcome {
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.reason.as_str())
    }

    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct RuleEngine {
    policy: RulePolicy,
    limits: LimitCalculator,
}

impl RuleEngine {
    pub fn new(policy: RulePolicy) -> Self {
        let limits = LimitCalculator::new(&policy);
        Self { policy, limits }
    }

    pub fn policy(&self) -> &RulePolicy {
        &self.policy
    }

    pub fn limits(&self) -> &LimitCalculator {
        &self.limits
    }

    pub fn evaluate(&self, input: &RuleInput, checks: &ChecksConfig) -> RuleOutcome {
        let mut violations = Vec::new();
        let transfer_type = input.transfer_type;
        let profile = self.limits.profile(input.user_avg, input.user_std);
        let threshold = self.limits.limit(input.user_avg, input.user_std, transfer_type);

        if input.amount > threshold {
            violations.push(RuleViolation::new(
                ViolationKind::AmountLimit,
                format!(
                    "Amount limit exceeded: {:.2} is above the {} limit of {:.2}",
                    input.amount,
                    transfer_type.name(),
                    threshold
                ),
            ));
        }

        let velocity = self.policy.velocity_limit(transfer_type);
        if checks.is_enabled(CheckKind::Velocity10Min) && input.txn_count_10min > velocity.max_10min {
            violations.push(RuleViolation::new(
                ViolationKind::Velocity10Min,
                format!(
                    "Velocity limit exceeded: {} transfers in the last 10 minutes (max {})",
                    input.txn_count_10min, velocity.max_10min
                ),
            ));
        }
        if checks.is_enabled(CheckKind::Velocity1Hour) && input.txn_count_1hour > velocity.max_1hour {
            violations.push(RuleViolation::new(
                ViolationKind::Velocity1Hour,
                format!(
                    "Velocity limit exceeded: {} transfers in the last hour (max {})",
                    input.txn_count_1hour, velocity.max_1hour
                ),
            ));
        }

        if checks.is_enabled(CheckKind::MonthlySpending) {
            let cap = self.policy.monthly_cap;
            let monthly_limit = (profile.avg + cap.std_factor * profile.std) * cap.month_factor;
            let projected = input.monthly_spending + input.amount;
            if projected > monthly_limit {
                violations.push(RuleViolation::new(
                    ViolationKind::MonthlySpending,
                    format!(
                        "Monthly spending limit exceeded: {:.2} this month including this transfer (cap {:.2})",
                        projected, monthly_limit
                    ),
                ));
            }
        }

        if checks.is_enabled(CheckKind::NewBeneficiary) && input.is_new_beneficiary {
            let beneficiary = &self.policy.new_beneficiary;
            let first_transfer_limit = threshold * beneficiary.limit_fraction;
            if input.amount > first_transfer_limit {
                violations.push(RuleViolation::new(
                    ViolationKind::NewBeneficiary,
                    format!(
                        "New beneficiary: first transfer of {:.2} is above {:.2}",
                        input.amount, first_transfer_limit
                    ),
                ));
            } else if beneficiary.risky_types.contains(&transfer_type) {
                violations.push(RuleViolation::new(
                    ViolationKind::NewBeneficiary,
                    format!(
                        "New beneficiary: first {} transfer to this recipient",
                        transfer_type.name()
                    ),
                ));
            }
        }

        if !violations.is_empty() {
            tracing::debug!(
                transfer_type = %transfer_type,
                count = violations.len(),
                threshold,
                "Rule violations detected"
            );
        }

        RuleOutcome {
            violated: !violations.is_empty(),
            violations,
            threshold,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RulePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: f64, transfer_type: TransferType) -> RuleInput {
        RuleInput {
            amount,
            transfer_type,
            txn_count_10min: 1,
            txn_count_1hour: 1,
            monthly_spending: 0.0,
            is_new_beneficiary: false,
            user_avg: 5000.0,
            user_std: 2000.0,
        }
    }

    #[test]
    fn test_clean_transfer() {
        let engine = RuleEngine::default();
        let outcome = engine.evaluate(&input(1000.0, TransferType::OwnAccount), &ChecksConfig::default());
        assert!(!outcome.violated);
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.threshold, 15000.0);
    }

    #[test]
    fn test_amount_limit() {
        let engine = RuleEngine::default();
        let outcome = engine.evaluate(&input(9000.01, TransferType::Overseas), &ChecksConfig::default());
        assert!(outcome.violated);
        assert!(outcome.has(ViolationKind::AmountLimit));
        assert!(outcome.reasons().next().unwrap().contains("Amount limit exceeded"));
    }

    #[test]
    fn test_amount_at_limit_passes() {
        let engine = RuleEngine::default();
        let outcome = engine.evaluate(&input(9000.0, TransferType::Overseas), &ChecksConfig::default());
        assert!(!outcome.has(ViolationKind::AmountLimit));
    }

    #[test]
    fn test_amount_check_cannot_be_disabled() {
        let engine = RuleEngine::default();
        let mut checks = ChecksConfig::default();
        for kind in CheckKind::ALL {
            checks.set(kind, false);
        }
        let outcome = engine.evaluate(&input(50000.0, TransferType::OwnAccount), &checks);
        assert!(outcome.has(ViolationKind::AmountLimit));
        assert_eq!(outcome.violations.len(), 1);
    }

    #[test]
    fn test_velocity_windows() {
        let engine = RuleEngine::default();
        let mut i = input(100.0, TransferType::Overseas);
        i.txn_count_10min = 4;
        i.txn_count_1hour = 9;

        let outcome = engine.evaluate(&i, &ChecksConfig::default());
        assert!(outcome.has(ViolationKind::Velocity10Min));
        assert!(outcome.has(ViolationKind::Velocity1Hour));

        let checks = ChecksConfig::default().with(CheckKind::Velocity10Min, false);
        let outcome = engine.evaluate(&i, &checks);
        assert!(!outcome.has(ViolationKind::Velocity10Min));
        assert!(outcome.has(ViolationKind::Velocity1Hour));
    }

    #[test]
    fn test_monthly_cap() {
        let engine = RuleEngine::default();
        // cap = (5000 + 3 * 2000) * 10 = 110000
        let mut i = input(5000.0, TransferType::OwnAccount);
        i.monthly_spending = 105000.0;
        assert!(!engine.evaluate(&i, &ChecksConfig::default()).violated);

        i.monthly_spending = 105000.5;
        let outcome = engine.evaluate(&i, &ChecksConfig::default());
        assert!(outcome.has(ViolationKind::MonthlySpending));

        let checks = ChecksConfig::default().with(CheckKind::MonthlySpending, false);
        assert!(!engine.evaluate(&i, &checks).violated);
    }

    #[test]
    fn test_new_beneficiary_amount() {
        let engine = RuleEngine::default();
        // own-account limit 15000, first transfer limit 7500
        let mut i = input(8000.0, TransferType::OwnAccount);
        i.is_new_beneficiary = true;
        assert!(engine.evaluate(&i, &ChecksConfig::default()).has(ViolationKind::NewBeneficiary));

        i.amount = 7000.0;
        assert!(!engine.evaluate(&i, &ChecksConfig::default()).violated);
    }

    #[test]
    fn test_new_beneficiary_risky_type() {
        let engine = RuleEngine::default();
        let mut i = input(100.0, TransferType::Overseas);
        i.is_new_beneficiary = true;
        let outcome = engine.evaluate(&i, &ChecksConfig::default());
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].kind, ViolationKind::NewBeneficiary);

        let checks = ChecksConfig::default().with(CheckKind::NewBeneficiary, false);
        assert!(!engine.evaluate(&i, &checks).violated);
    }

    #[test]
    fn test_violations_accumulate_in_order() {
        let engine = RuleEngine::default();
        let mut i = input(60000.0, TransferType::Overseas);
        i.txn_count_10min = 10;
        i.txn_count_1hour = 20;
        i.monthly_spending = 200000.0;
        i.is_new_beneficiary = true;

        let kinds: Vec<_> = engine
            .evaluate(&i, &ChecksConfig::default())
            .violations
            .iter()
            .map(|v| v.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::AmountLimit,
                ViolationKind::Velocity10Min,
                ViolationKind::Velocity1Hour,
                ViolationKind::MonthlySpending,
                ViolationKind::NewBeneficiary,
            ]
        );
    }

    #[test]
    fn test_from_parts() {
        let txn = Transaction::new(250.0, TransferType::MobilePay)
            .with_velocity(1, 2, 3)
            .with_new_beneficiary(true);
        let mut stats = UserStatistics::default();
        stats.current_month_spending = 900.0;

        let i = RuleInput::from_parts(&txn, &stats);
        assert_eq!(i.txn_count_10min, 2);
        assert_eq!(i.monthly_spending, 900.0);
        assert!(i.is_new_beneficiary);
        assert_eq!(i.user_avg, 5000.0);
    }
}
