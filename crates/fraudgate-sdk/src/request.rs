//! Transfer request validation

use crate::error::{Result, SdkError};
use chrono::{DateTime, Utc};
use fraudgate_core::TransferType;
use serde::{Deserialize, Serialize};

/// Currencies accepted on either side of a transfer
pub const SUPPORTED_CURRENCIES: [&str; 9] =
    ["AED", "USD", "EUR", "GBP", "SAR", "QAR", "OMR", "KWD", "BHD"];

/// Accepted charge bearer codes. Empty means bank default.
pub const CHARGES_TYPES: [&str; 4] = ["OUR", "BEN", "SHA", ""];

fn default_currency() -> String {
    "AED".to_string()
}

fn default_bank_country() -> String {
    "UAE".to_string()
}

/// One transfer as submitted by a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub customer_id: String,

    pub from_account_no: String,

    #[serde(default = "default_currency")]
    pub from_account_currency: String,

    /// Recipient account or IBAN
    #[serde(default)]
    pub to_account_no: String,

    pub amount: f64,

    #[serde(default = "default_currency")]
    pub transfer_currency: String,

    pub transfer_type: TransferType,

    #[serde(default)]
    pub charges_type: String,

    #[serde(default)]
    pub swift_code: String,

    #[serde(default = "default_bank_country")]
    pub bank_country: String,

    #[serde(default)]
    pub initiated_at: Option<DateTime<Utc>>,
}

impl TransferRequest {
    pub fn new(
        customer_id: impl Into<String>,
        from_account_no: impl Into<String>,
        to_account_no: impl Into<String>,
        amount: f64,
        transfer_type: TransferType,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            from_account_no: from_account_no.into(),
            from_account_currency: default_currency(),
            to_account_no: to_account_no.into(),
            amount,
            transfer_currency: default_currency(),
            transfer_type,
            charges_type: String::new(),
            swift_code: String::new(),
            bank_country: default_bank_country(),
            initiated_at: None,
        }
    }

    pub fn with_swift(mut self, swift_code: impl Into<String>) -> Self {
        self.swift_code = swift_code.into();
        self
    }

    pub fn with_bank_country(mut self, country: impl Into<String>) -> Self {
        self.bank_country = country.into();
        self
    }

    pub fn with_currencies(mut self, from: impl Into<String>, transfer: impl Into<String>) -> Self {
        self.from_account_currency = from.into();
        self.transfer_currency = transfer.into();
        self
    }

    pub fn with_charges_type(mut self, charges_type: impl Into<String>) -> Self {
        self.charges_type = charges_type.into();
        self
    }

    pub fn with_initiated_at(mut self, at: DateTime<Utc>) -> Self {
        self.initiated_at = Some(at);
        self
    }

    /// Reject requests that cannot be screened
    pub fn validate(&self) -> Result<()> {
        if self.customer_id.trim().is_empty() {
            return Err(SdkError::InvalidRequest("customer_id is required".to_string()));
        }
        if self.from_account_no.trim().is_empty() {
            return Err(SdkError::InvalidRequest("from_account_no is required".to_string()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(SdkError::InvalidRequest(format!(
                "amount must be greater than zero, got {}",
                self.amount
            )));
        }

        if matches!(
            self.transfer_type,
            TransferType::OwnAccount | TransferType::InternalBank
        ) && self.to_account_no.trim().is_empty()
        {
            return Err(SdkError::InvalidRequest(format!(
                "to_account_no required for transfer type {}",
                self.transfer_type.code()
            )));
        }

        if self.transfer_type == TransferType::Overseas && self.swift_code.trim().is_empty() {
            return Err(SdkError::InvalidRequest(
                "SWIFT code required for international transfers".to_string(),
            ));
        }

        if !SUPPORTED_CURRENCIES.contains(&self.from_account_currency.as_str()) {
            return Err(SdkError::InvalidRequest(format!(
                "Invalid from_account_currency: {}",
                self.from_account_currency
            )));
        }
        if !SUPPORTED_CURRENCIES.contains(&self.transfer_currency.as_str()) {
            return Err(SdkError::InvalidRequest(format!(
                "Invalid transfer_currency: {}",
                self.transfer_currency
            )));
        }

        if !CHARGES_TYPES.contains(&self.charges_type.as_str()) {
            return Err(SdkError::InvalidRequest(
                "charges_type must be OUR, BEN, SHA or empty".to_string(),
            ));
        }

        Ok(())
    }
}
