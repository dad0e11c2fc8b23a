//! Transfer request types

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transfer channel.
///
/// Serialized with the single-letter codes used by the core banking system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransferType {
    /// Between the customer's own accounts
    #[serde(rename = "O")]
    OwnAccount,
    /// To another customer of the same bank
    #[serde(rename = "I")]
    InternalBank,
    /// To another domestic bank
    #[serde(rename = "L")]
    DomesticOther,
    /// Quick remittance
    #[serde(rename = "Q")]
    QuickRemit,
    /// International wire
    #[serde(rename = "S")]
    Overseas,
    #[serde(rename = "M")]
    MobilePay,
    #[serde(rename = "F")]
    FamilyTransfer,
}

impl TransferType {
    /// Every transfer type, in display order
    pub const ALL: [TransferType; 7] = [
        TransferType::OwnAccount,
        TransferType::InternalBank,
        TransferType::DomesticOther,
        TransferType::QuickRemit,
        TransferType::Overseas,
        TransferType::MobilePay,
        TransferType::FamilyTransfer,
    ];

    /// Single-letter channel code
    pub fn code(&self) -> char {
        match self {
            TransferType::OwnAccount => 'O',
            TransferType::InternalBank => 'I',
            TransferType::DomesticOther => 'L',
            TransferType::QuickRemit => 'Q',
            TransferType::Overseas => 'S',
            TransferType::MobilePay => 'M',
            TransferType::FamilyTransfer => 'F',
        }
    }

    /// Parse a single-letter channel code (case-insensitive)
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "O" => Ok(TransferType::OwnAccount),
            "I" => Ok(TransferType::InternalBank),
            "L" => Ok(TransferType::DomesticOther),
            "Q" => Ok(TransferType::QuickRemit),
            "S" => Ok(TransferType::Overseas),
            "M" => Ok(TransferType::MobilePay),
            "F" => Ok(TransferType::FamilyTransfer),
            other => Err(CoreError::UnknownTransferType(other.to_string())),
        }
    }

    /// Human-readable channel name
    pub fn name(&self) -> &'static str {
        match self {
            TransferType::OwnAccount => "Own Account",
            TransferType::InternalBank => "Internal Bank",
            TransferType::DomesticOther => "Domestic",
            TransferType::QuickRemit => "Quick Remittance",
            TransferType::Overseas => "Overseas",
            TransferType::MobilePay => "MobilePay",
            TransferType::FamilyTransfer => "Family Transfer",
        }
    }

    /// Integer encoding the anomaly models were trained with
    pub fn encoded(&self) -> f64 {
        match self {
            TransferType::OwnAccount => 0.0,
            TransferType::InternalBank => 1.0,
            TransferType::DomesticOther => 2.0,
            TransferType::QuickRemit => 3.0,
            TransferType::Overseas => 4.0,
            TransferType::MobilePay => 5.0,
            TransferType::FamilyTransfer => 6.0,
        }
    }

    /// Channel risk weight in [0, 1] used as a model feature
    pub fn risk_weight(&self) -> f64 {
        match self {
            TransferType::OwnAccount => 0.0,
            TransferType::InternalBank => 0.1,
            TransferType::DomesticOther => 0.2,
            TransferType::FamilyTransfer => 0.2,
            TransferType::MobilePay => 0.3,
            TransferType::QuickRemit => 0.5,
            TransferType::Overseas => 0.9,
        }
    }

    /// True for cross-border transfers
    pub fn is_international(&self) -> bool {
        matches!(self, TransferType::Overseas)
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TransferType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

/// A single inbound transfer, assembled by the caller for one decision call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Amount in the bank's base currency
    pub amount: f64,

    pub transfer_type: TransferType,

    /// Country of the beneficiary bank
    pub bank_country: String,

    /// Transfers in the last 30 seconds, including this one
    pub txn_count_30s: u32,

    /// Transfers in the last 10 minutes, including this one
    pub txn_count_10min: u32,

    /// Transfers in the last hour, including this one
    pub txn_count_1hour: u32,

    /// Seconds since the previous transfer
    pub time_since_last_txn: f64,

    /// Beneficiary novelty. `None` means the caller did not check.
    #[serde(default)]
    pub is_new_beneficiary: Option<bool>,

    /// When the customer initiated the transfer
    #[serde(default)]
    pub initiated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a transaction with neutral velocity context
    pub fn new(amount: f64, transfer_type: TransferType) -> Self {
        Self {
            amount,
            transfer_type,
            bank_country: "UAE".to_string(),
            txn_count_30s: 1,
            txn_count_10min: 1,
            txn_count_1hour: 1,
            time_since_last_txn: 3600.0,
            is_new_beneficiary: None,
            initiated_at: None,
        }
    }

    /// Set the beneficiary bank country
    pub fn with_bank_country(mut self, country: impl Into<String>) -> Self {
        self.bank_country = country.into();
        self
    }

    /// Set the rolling velocity counters
    pub fn with_velocity(mut self, count_30s: u32, count_10min: u32, count_1hour: u32) -> Self {
        self.txn_count_30s = count_30s;
        self.txn_count_10min = count_10min;
        self.txn_count_1hour = count_1hour;
        self
    }

    /// Set seconds since the previous transfer
    pub fn with_time_since_last(mut self, seconds: f64) -> Self {
        self.time_since_last_txn = seconds;
        self
    }

    /// Set beneficiary novelty
    pub fn with_new_beneficiary(mut self, is_new: bool) -> Self {
        self.is_new_beneficiary = Some(is_new);
        self
    }

    /// Set the initiation timestamp
    pub fn with_initiated_at(mut self, at: DateTime<Utc>) -> Self {
        self.initiated_at = Some(at);
        self
    }

    /// Beneficiary novelty with unknown treated as an existing beneficiary
    pub fn has_new_beneficiary(&self) -> bool {
        self.is_new_beneficiary.unwrap_or(false)
    }

    /// Reject amounts the engine cannot reason about
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::InvalidValue(format!(
                "transfer amount must be positive, got {}",
                self.amount
            )));
        }
        if !self.time_since_last_txn.is_finite() || self.time_since_last_txn < 0.0 {
            return Err(CoreError::InvalidValue(format!(
                "time since last transfer must be non-negative, got {}",
                self.time_since_last_txn
            )));
        }
        Ok(())
    }
}
