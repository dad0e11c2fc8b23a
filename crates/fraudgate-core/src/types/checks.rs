//! Per-customer check toggles
//!
//! Checks are configured per (customer, account, transfer type) in the
//! configuration store. Every check is enabled unless a row explicitly turns
//! it off.

use serde::{Deserialize, Serialize};

/// A togglable check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Velocity10Min,
    Velocity1Hour,
    MonthlySpending,
    NewBeneficiary,
    IsolationForest,
    Autoencoder,
}

impl CheckKind {
    pub const ALL: [CheckKind; 6] = [
        CheckKind::Velocity10Min,
        CheckKind::Velocity1Hour,
        CheckKind::MonthlySpending,
        CheckKind::NewBeneficiary,
        CheckKind::IsolationForest,
        CheckKind::Autoencoder,
    ];

    /// Parameter name used by the configuration store
    pub fn parameter_name(&self) -> &'static str {
        match self {
            CheckKind::Velocity10Min => "velocity_check_10min",
            CheckKind::Velocity1Hour => "velocity_check_1hour",
            CheckKind::MonthlySpending => "monthly_spending_check",
            CheckKind::NewBeneficiary => "new_beneficiary_check",
            CheckKind::IsolationForest => "isolation_forest_check",
            CheckKind::Autoencoder => "autoencoder_check",
        }
    }

    /// Look up a check by its store parameter name
    pub fn from_parameter_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.parameter_name() == name)
    }
}

/// One row of check configuration as stored externally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSetting {
    pub parameter_name: String,

    #[serde(default)]
    pub is_enabled: Option<bool>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CheckSetting {
    pub fn new(parameter_name: impl Into<String>, is_enabled: bool) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            is_enabled: Some(is_enabled),
            is_active: true,
        }
    }
}

/// Enabled checks for one (customer, account, transfer type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_true")]
    pub velocity_10min: bool,
    #[serde(default = "default_true")]
    pub velocity_1hour: bool,
    #[serde(default = "default_true")]
    pub monthly_spending: bool,
    #[serde(default = "default_true")]
    pub new_beneficiary: bool,
    #[serde(default = "default_true")]
    pub isolation_forest: bool,
    #[serde(default = "default_true")]
    pub autoencoder: bool,
}

impl ChecksConfig {
    /// All checks enabled
    pub fn all_enabled() -> Self {
        Self {
            velocity_10min: true,
            velocity_1hour: true,
            monthly_spending: true,
            new_beneficiary: true,
            isolation_forest: true,
            autoencoder: true,
        }
    }

    /// Build from store rows. Inactive rows and unknown parameters are ignored;
    /// a row with no explicit value leaves the check enabled.
    pub fn from_settings<'a, I>(settings: I) -> Self
    where
        I: IntoIterator<Item = &'a CheckSetting>,
    {
        let mut config = Self::all_enabled();
        for setting in settings {
            if !setting.is_active {
                continue;
            }
            match CheckKind::from_parameter_name(&setting.parameter_name) {
                Some(kind) => config.set(kind, setting.is_enabled.unwrap_or(true)),
                None => log::debug!("Ignoring unknown check parameter '{}'", setting.parameter_name),
            }
        }
        config
    }

    pub fn is_enabled(&self, kind: CheckKind) -> bool {
        match kind {
            CheckKind::Velocity10Min => self.velocity_10min,
            CheckKind::Velocity1Hour => self.velocity_1hour,
            CheckKind::MonthlySpending => self.monthly_spending,
            CheckKind::NewBeneficiary => self.new_beneficiary,
            CheckKind::IsolationForest => self.isolation_forest,
            CheckKind::Autoencoder => self.autoencoder,
        }
    }

    pub fn set(&mut self, kind: CheckKind, enabled: bool) {
        match kind {
            CheckKind::Velocity10Min => self.velocity_10min = enabled,
            CheckKind::Velocity1Hour => self.velocity_1hour = enabled,
            CheckKind::MonthlySpending => self.monthly_spending = enabled,
            CheckKind::NewBeneficiary => self.new_beneficiary = enabled,
            CheckKind::IsolationForest => self.isolation_forest = enabled,
            CheckKind::Autoencoder => self.autoencoder = enabled,
        }
    }

    /// Builder-style toggle
    pub fn with(mut self, kind: CheckKind, enabled: bool) -> Self {
        self.set(kind, enabled);
        self
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self::all_enabled()
    }
}

fn default_true() -> bool {
    true
}
