//! Feature engineering for the anomaly detectors
//!
//! Builds one named [`FeatureMap`] per transfer from the transaction and the
//! customer's statistics. Each detector projects the map through its own
//! schema, so a model trained on a subset of these features only sees that
//! subset.

use chrono::{Datelike, Timelike};
use fraudgate_core::{FeatureMap, Transaction, TransferType, UserStatistics};
use serde::{Deserialize, Serialize};

/// Transfers closer together than this many seconds count as a burst
pub const BURST_WINDOW_SECS: f64 = 300.0;

/// Settings for the feature builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Bank country names treated as domestic
    pub home_countries: Vec<String>,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            home_countries: vec!["UAE".to_string(), "United Arab Emirates".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    settings: FeatureSettings,
}

impl FeatureBuilder {
    pub fn new(settings: FeatureSettings) -> Self {
        Self { settings }
    }

    pub fn is_home_country(&self, country: &str) -> bool {
        let country = country.trim();
        self.settings
            .home_countries
            .iter()
            .any(|home| home.eq_ignore_ascii_case(country))
    }

    pub fn build(&self, txn: &Transaction, stats: &UserStatistics) -> FeatureMap {
        let mut map = FeatureMap::new();
        let amount = txn.amount;
        let transfer_type = txn.transfer_type;

        // transaction
        map.insert("amount", amount);
        map.insert("transaction_amount", amount);
        map.insert_flag("flag_amount", transfer_type == TransferType::Overseas);
        map.insert("transfer_type_encoded", transfer_type.encoded());
        map.insert("transfer_type_risk", transfer_type.risk_weight());
        map.insert("channel_encoded", 0.0);

        // deviation from the customer's profile
        let user_avg = stats.avg_amount;
        let user_max = stats.max_amount.max(1.0);
        map.insert("deviation_from_avg", (amount - user_avg).abs());
        map.insert("amount_to_max_ratio", amount / user_max);
        map.insert("rolling_std", stats.std_amount);

        let time_since_last = txn.time_since_last_txn;
        map.insert("transaction_velocity", 3600.0 / time_since_last.max(1.0));

        let weekly_avg = stats.weekly_avg_amount;
        map.insert("weekly_total", stats.weekly_total);
        map.insert("weekly_txn_count", stats.weekly_txn_count as f64);
        map.insert("weekly_avg_amount", weekly_avg);
        if weekly_avg > 0.0 {
            map.insert("weekly_deviation", (amount - weekly_avg).abs());
            map.insert("amount_vs_weekly_avg", amount / weekly_avg.max(1.0));
        } else {
            map.insert("weekly_deviation", 0.0);
            map.insert("amount_vs_weekly_avg", 1.0);
        }

        let monthly_avg = stats.effective_monthly_avg();
        map.insert("current_month_spending", stats.current_month_spending);
        map.insert("monthly_txn_count", stats.effective_monthly_count() as f64);
        map.insert("monthly_avg_amount", monthly_avg);
        map.insert("monthly_deviation", (amount - monthly_avg).abs());
        map.insert("amount_vs_monthly_avg", amount / monthly_avg.max(1.0));

        // the current transfer is the only one in its hour/day bucket we know of
        map.insert("hourly_total", amount);
        map.insert("hourly_count", 1.0);
        map.insert("daily_total", amount);
        map.insert("daily_count", 1.0);

        self.insert_time_features(&mut map, txn);

        map.insert("time_since_last", time_since_last);
        map.insert("time_since_last_txn", time_since_last);
        map.insert_flag("recent_burst", time_since_last < BURST_WINDOW_SECS);
        map.insert("txn_count_30s", txn.txn_count_30s as f64);
        map.insert("txn_count_10min", txn.txn_count_10min as f64);
        map.insert("txn_count_1hour", txn.txn_count_1hour as f64);

        // customer profile
        map.insert("user_avg_amount", user_avg);
        map.insert("user_std_amount", stats.std_amount);
        map.insert("user_max_amount", stats.max_amount);
        map.insert("user_txn_frequency", stats.txn_frequency as f64);
        map.insert("intl_ratio", stats.international_ratio);
        map.insert(
            "user_high_risk_txn_ratio",
            stats.high_risk_txn_ratio.unwrap_or(0.5),
        );
        map.insert_flag(
            "user_multiple_accounts_flag",
            stats.num_accounts.unwrap_or(1) > 1,
        );
        map.insert(
            "cross_account_transfer_ratio",
            stats.cross_account_transfer_ratio.unwrap_or(0.0),
        );

        // destination
        map.insert_flag("geo_anomaly_flag", !self.is_home_country(&txn.bank_country));
        map.insert_flag("is_new_beneficiary", txn.has_new_beneficiary());
        map.insert(
            "beneficiary_txn_count_30d",
            stats.beneficiary_txn_count_30d.unwrap_or(1) as f64,
        );

        map
    }

    /// Hour, weekday, weekend and night flags. Without a timestamp these take
    /// the neutral values the models were trained with: noon on a Monday.
    fn insert_time_features(&self, map: &mut FeatureMap, txn: &Transaction) {
        match txn.initiated_at {
            Some(at) => {
                let hour = at.hour();
                let day_of_week = at.weekday().num_days_from_monday();
                map.insert("hour", hour as f64);
                map.insert("day_of_week", day_of_week as f64);
                map.insert_flag("is_weekend", day_of_week >= 5);
                map.insert_flag("is_night", hour < 6 || hour >= 22);
            }
            None => {
                map.insert("hour", 12.0);
                map.insert("day_of_week", 0.0);
                map.insert("is_weekend", 0.0);
                map.insert("is_night", 0.0);
            }
        }
    }
}
