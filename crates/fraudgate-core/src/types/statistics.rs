//! Customer statistics snapshots
//!
//! Statistics are computed by the history store and handed to the engine as a
//! flat key/value map. Any key that is missing or not a finite number falls
//! back to the default profile, so a degraded upstream never fails a request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Historical spending profile for one (customer, account) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub avg_amount: f64,
    pub std_amount: f64,
    pub max_amount: f64,

    /// Number of historical transfers
    pub txn_frequency: u32,

    /// Share of historical transfers that were international
    pub international_ratio: f64,

    /// Spending so far in the current calendar month
    pub current_month_spending: f64,

    pub weekly_total: f64,
    pub weekly_txn_count: u32,
    pub weekly_avg_amount: f64,
    pub weekly_deviation: f64,

    pub monthly_txn_count: u32,
    pub monthly_avg_amount: f64,
    pub monthly_deviation: f64,

    /// Mean channel risk weight over the customer's history
    #[serde(default)]
    pub high_risk_txn_ratio: Option<f64>,

    /// Number of accounts the customer holds
    #[serde(default)]
    pub num_accounts: Option<u32>,

    #[serde(default)]
    pub cross_account_transfer_ratio: Option<f64>,

    /// Transfers to this beneficiary in the last 30 days
    #[serde(default)]
    pub beneficiary_txn_count_30d: Option<u32>,
}

impl UserStatistics {
    pub const DEFAULT_AVG_AMOUNT: f64 = 5000.0;
    pub const DEFAULT_STD_AMOUNT: f64 = 2000.0;
    pub const DEFAULT_MAX_AMOUNT: f64 = 15000.0;

    /// Build statistics from a flat key/value map.
    ///
    /// Recognised keys mirror the history store's column aliases
    /// (`user_avg_amount`, `user_weekly_total`, `current_month_spending`, ...).
    pub fn from_map(values: &HashMap<String, f64>) -> Self {
        let defaults = Self::default();
        let num = |key: &str, fallback: f64| -> f64 {
            match values.get(key) {
                Some(v) if v.is_finite() => *v,
                Some(v) => {
                    log::warn!("Ignoring non-finite statistic {}={}", key, v);
                    fallback
                }
                None => fallback,
            }
        };
        let count = |key: &str, fallback: u32| -> u32 {
            match values.get(key) {
                Some(v) if v.is_finite() && *v >= 0.0 => *v as u32,
                _ => fallback,
            }
        };
        let opt = |key: &str| values.get(key).copied().filter(|v| v.is_finite());

        Self {
            avg_amount: num("user_avg_amount", defaults.avg_amount),
            std_amount: num("user_std_amount", defaults.std_amount),
            max_amount: num("user_max_amount", defaults.max_amount),
            txn_frequency: count("user_txn_frequency", defaults.txn_frequency),
            international_ratio: num("user_international_ratio", defaults.international_ratio),
            current_month_spending: num("current_month_spending", 0.0),
            weekly_total: num("user_weekly_total", 0.0),
            weekly_txn_count: count("user_weekly_txn_count", 0),
            weekly_avg_amount: num("user_weekly_avg_amount", 0.0),
            weekly_deviation: num("user_weekly_deviation", 0.0),
            monthly_txn_count: count("user_monthly_txn_count", 0),
            monthly_avg_amount: num("user_monthly_avg_amount", 0.0),
            monthly_deviation: num("user_monthly_deviation", 0.0),
            high_risk_txn_ratio: opt("user_high_risk_txn_ratio"),
            num_accounts: opt("num_accounts").filter(|v| *v >= 0.0).map(|v| v as u32),
            cross_account_transfer_ratio: opt("cross_account_transfer_ratio"),
            beneficiary_txn_count_30d: opt("beneficiary_txn_count_30d")
                .filter(|v| *v >= 0.0)
                .map(|v| v as u32),
        }
    }

    /// True when the customer has no usable transfer history
    pub fn is_zero_history(&self) -> bool {
        self.txn_frequency == 0 || !self.avg_amount.is_finite() || self.avg_amount <= 0.0
    }

    /// Monthly average, falling back to the all-time average when the month is empty
    pub fn effective_monthly_avg(&self) -> f64 {
        if self.monthly_avg_amount > 0.0 {
            self.monthly_avg_amount
        } else {
            self.avg_amount
        }
    }

    /// Monthly transfer count, falling back to the all-time frequency
    pub fn effective_monthly_count(&self) -> u32 {
        if self.monthly_txn_count > 0 {
            self.monthly_txn_count
        } else {
            self.txn_frequency
        }
    }
}

impl Default for UserStatistics {
    fn default() -> Self {
        Self {
            avg_amount: Self::DEFAULT_AVG_AMOUNT,
            std_amount: Self::DEFAULT_STD_AMOUNT,
            max_amount: Self::DEFAULT_MAX_AMOUNT,
            txn_frequency: 0,
            international_ratio: 0.0,
            current_month_spending: 0.0,
            weekly_total: 0.0,
            weekly_txn_count: 0,
            weekly_avg_amount: 0.0,
            weekly_deviation: 0.0,
            monthly_txn_count: 0,
            monthly_avg_amount: 0.0,
            monthly_deviation: 0.0,
            high_risk_txn_ratio: None,
            num_accounts: None,
            cross_account_transfer_ratio: None,
            beneficiary_txn_count_30d: None,
        }
    }
}

/// Recent activity counters for one (customer, account) pair.
///
/// Counts exclude the transfer being decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocitySnapshot {
    pub txn_count_30s: u32,
    pub txn_count_10min: u32,
    pub txn_count_1hour: u32,
    pub time_since_last_txn: f64,
}

impl VelocitySnapshot {
    /// Build a snapshot from a flat key/value map
    pub fn from_map(values: &HashMap<String, f64>) -> Self {
        let defaults = Self::default();
        let count = |key: &str, fallback: u32| -> u32 {
            match values.get(key) {
                Some(v) if v.is_finite() && *v >= 0.0 => *v as u32,
                _ => fallback,
            }
        };

        Self {
            txn_count_30s: count("txn_count_30s", defaults.txn_count_30s),
            txn_count_10min: count("txn_count_10min", defaults.txn_count_10min),
            txn_count_1hour: count("txn_count_1hour", defaults.txn_count_1hour),
            time_since_last_txn: values
                .get("time_since_last_txn")
                .copied()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.time_since_last_txn),
        }
    }
}

impl Default for VelocitySnapshot {
    fn default() -> Self {
        Self {
            txn_count_30s: 0,
            txn_count_10min: 0,
            txn_count_1hour: 0,
            time_since_last_txn: 3600.0,
        }
    }
}
