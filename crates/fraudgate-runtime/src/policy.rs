//! Rule policy
//!
//! The policy holds every tunable constant of the rule engine: per-type limit
//! multipliers, velocity maxima, the monthly cap factors and the
//! new-beneficiary policy. It is plain data and can be loaded from YAML.

use crate::error::{Result, RuntimeError};
use fraudgate_core::TransferType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One value per transfer type, keyed by channel code in serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTable<T> {
    #[serde(rename = "O")]
    pub own_account: T,
    #[serde(rename = "I")]
    pub internal_bank: T,
    #[serde(rename = "L")]
    pub domestic_other: T,
    #[serde(rename = "Q")]
    pub quick_remit: T,
    #[serde(rename = "S")]
    pub overseas: T,
    #[serde(rename = "M")]
    pub mobile_pay: T,
    #[serde(rename = "F")]
    pub family_transfer: T,
}

impl<T> TransferTable<T> {
    pub fn get(&self, transfer_type: TransferType) -> &T {
        match transfer_type {
            TransferType::OwnAccount => &self.own_account,
            TransferType::InternalBank => &self.internal_bank,
            TransferType::DomesticOther => &self.domestic_other,
            TransferType::QuickRemit => &self.quick_remit,
            TransferType::Overseas => &self.overseas,
            TransferType::MobilePay => &self.mobile_pay,
            TransferType::FamilyTransfer => &self.family_transfer,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransferType, &T)> {
        TransferType::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}

/// Maximum transfers allowed in each rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityLimit {
    pub max_10min: u32,
    pub max_1hour: u32,
}

impl VelocityLimit {
    pub const fn new(max_10min: u32, max_1hour: u32) -> Self {
        Self {
            max_10min,
            max_1hour,
        }
    }
}

/// Monthly cap: `(avg + std_factor * std) * month_factor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCapPolicy {
    pub std_factor: f64,
    pub month_factor: f64,
}

impl Default for MonthlyCapPolicy {
    fn default() -> Self {
        Self {
            std_factor: 3.0,
            month_factor: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryPolicy {
    /// Share of the amount limit a first transfer to a new beneficiary may use
    pub limit_fraction: f64,

    /// Transfer types where any first transfer to a new beneficiary is flagged
    pub risky_types: Vec<TransferType>,
}

impl Default for BeneficiaryPolicy {
    fn default() -> Self {
        Self {
            limit_fraction: 0.5,
            risky_types: vec![TransferType::Overseas],
        }
    }
}

/// All rule engine constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePolicy {
    /// Standard-deviation multiplier per transfer type. Riskier channels get tighter limits.
    pub multipliers: TransferTable<f64>,

    pub velocity: TransferTable<VelocityLimit>,

    pub monthly_cap: MonthlyCapPolicy,

    pub new_beneficiary: BeneficiaryPolicy,

    /// Profile used for customers without usable history
    pub default_avg_amount: f64,
    pub default_std_amount: f64,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            multipliers: TransferTable {
                own_account: 5.0,
                internal_bank: 3.5,
                domestic_other: 3.0,
                quick_remit: 2.5,
                overseas: 2.0,
                mobile_pay: 2.5,
                family_transfer: 3.0,
            },
            velocity: TransferTable {
                own_account: VelocityLimit::new(10, 30),
                internal_bank: VelocityLimit::new(6, 20),
                domestic_other: VelocityLimit::new(5, 15),
                quick_remit: VelocityLimit::new(4, 12),
                overseas: VelocityLimit::new(3, 8),
                mobile_pay: VelocityLimit::new(4, 12),
                family_transfer: VelocityLimit::new(5, 15),
            },
            monthly_cap: MonthlyCapPolicy::default(),
            new_beneficiary: BeneficiaryPolicy::default(),
            default_avg_amount: 5000.0,
            default_std_amount: 2000.0,
        }
    }
}

impl RulePolicy {
    /// Parse a policy from YAML. Omitted sections keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let policy: RulePolicy = serde_yaml::from_str(yaml)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn multiplier(&self, transfer_type: TransferType) -> f64 {
        *self.multipliers.get(transfer_type)
    }

    pub fn velocity_limit(&self, transfer_type: TransferType) -> VelocityLimit {
        *self.velocity.get(transfer_type)
    }

    pub fn validate(&self) -> Result<()> {
        for (transfer_type, k) in self.multipliers.iter() {
            if !k.is_finite() || *k <= 0.0 {
                return Err(RuntimeError::InvalidPolicy(format!(
                    "multiplier for {} must be positive, got {}",
                    transfer_type, k
                )));
            }
        }
        for (transfer_type, limit) in self.velocity.iter() {
            if limit.max_10min > limit.max_1hour {
                return Err(RuntimeError::InvalidPolicy(format!(
                    "{} velocity: 10 minute maximum {} exceeds hourly maximum {}",
                    transfer_type, limit.max_10min, limit.max_1hour
                )));
            }
        }
        let cap = &self.monthly_cap;
        if !(cap.std_factor >= 0.0 && cap.month_factor > 0.0) {
            return Err(RuntimeError::InvalidPolicy(format!(
                "monthly cap factors must be non-negative, got std {} month {}",
                cap.std_factor, cap.month_factor
            )));
        }
        let fraction = self.new_beneficiary.limit_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(RuntimeError::InvalidPolicy(format!(
                "new beneficiary limit fraction must be within (0, 1], got {}",
                fraction
            )));
        }
        if !(self.default_avg_amount > 0.0 && self.default_std_amount >= 0.0) {
            return Err(RuntimeError::InvalidPolicy(
                "default profile must have a positive average and non-negative deviation".to_string(),
            ));
        }
        Ok(())
    }
}
