//! Per-transfer-type spending limits
//!
//! `limit(type) = avg + k(type) * std`, where `k` comes from the rule policy.

use crate::policy::{RulePolicy, TransferTable};
use fraudgate_core::TransferType;
use serde::Serialize;

/// Effective spending profile after zero-history fallback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpendingProfile {
    pub avg: f64,
    pub std: f64,
    /// True when the caller's statistics were replaced by defaults
    pub defaulted: bool,
}

/// Limit row for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TypeLimit {
    pub transfer_type: TransferType,
    pub multiplier: f64,
    pub limit: f64,
}

#[derive(Debug, Clone)]
pub struct LimitCalculator {
    multipliers: TransferTable<f64>,
    default_avg: f64,
    default_std: f64,
}

impl LimitCalculator {
    pub fn new(policy: &RulePolicy) -> Self {
        Self {
            multipliers: policy.multipliers.clone(),
            default_avg: policy.default_avg_amount,
            default_std: policy.default_std_amount,
        }
    }

    /// Resolve the profile limits are computed from.
    ///
    /// A customer with no usable average (zero, negative or non-finite) gets
    /// the default profile. A usable average with an unusable deviation keeps
    /// the average and takes the default deviation.
    pub fn profile(&self, avg: f64, std: f64) -> SpendingProfile {
        if !avg.is_finite() || avg <= 0.0 {
            return SpendingProfile {
                avg: self.default_avg,
                std: self.default_std,
                defaulted: true,
            };
        }
        if !std.is_finite() || std < 0.0 {
            return SpendingProfile {
                avg,
                std: self.default_std,
                defaulted: true,
            };
        }
        SpendingProfile {
            avg,
            std,
            defaulted: false,
        }
    }

    pub fn multiplier(&self, transfer_type: TransferType) -> f64 {
        *self.multipliers.get(transfer_type)
    }

    /// Spending ceiling for one transfer type
    pub fn limit(&self, avg: f64, std: f64, transfer_type: TransferType) -> f64 {
        let profile = self.profile(avg, std);
        profile.avg + self.multiplier(transfer_type) * profile.std
    }

    /// Ceiling for every transfer type, in `TransferType::ALL` order
    pub fn limits_for_all(&self, avg: f64, std: f64) -> Vec<TypeLimit> {
        TransferType::ALL
            .into_iter()
            .map(|transfer_type| TypeLimit {
                transfer_type,
                multiplier: self.multiplier(transfer_type),
                limit: self.limit(avg, std, transfer_type),
            })
            .collect()
    }
}

impl Default for LimitCalculator {
    fn default() -> Self {
        Self::new(&RulePolicy::default())
    }
}
