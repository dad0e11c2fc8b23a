//! Structured rule violations

use serde::{Deserialize, Serialize};

/// What a rule violation was about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    AmountLimit,
    Velocity10Min,
    Velocity1Hour,
    MonthlySpending,
    NewBeneficiary,
}

impl ViolationKind {
    pub fn is_velocity(&self) -> bool {
        matches!(self, ViolationKind::Velocity10Min | ViolationKind::Velocity1Hour)
    }
}

/// A single violated rule with its rendered reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub kind: ViolationKind,
    pub reason: String,
}

impl RuleViolation {
    pub fn new(kind: ViolationKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}
