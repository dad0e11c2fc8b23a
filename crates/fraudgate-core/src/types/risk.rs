//! Risk thresholds and confidence weights
//!
//! `RiskConfig` is an immutable snapshot. Callers refresh it by building a new
//! value (usually from threshold rows in the configuration store) and swapping
//! it in whole.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk level, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [RiskLevel::Safe, RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anomaly score cut-offs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 0.85,
            medium: 0.65,
            low: 0.45,
        }
    }
}

/// Confidence assigned by number of agreeing detectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub all_agree: f64,
    pub two_agree: f64,
    pub one_agrees: f64,
    pub high_risk_boost: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            all_agree: 0.95,
            two_agree: 0.75,
            one_agrees: 0.50,
            high_risk_boost: 0.15,
        }
    }
}

/// Display labels per risk level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLabels {
    pub safe: String,
    pub low: String,
    pub medium: String,
    pub high: String,
}

impl Default for RiskLabels {
    fn default() -> Self {
        Self {
            safe: RiskLevel::Safe.as_str().to_string(),
            low: RiskLevel::Low.as_str().to_string(),
            medium: RiskLevel::Medium.as_str().to_string(),
            high: RiskLevel::High.as_str().to_string(),
        }
    }
}

/// One threshold row from the configuration store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub name: String,
    pub value: f64,

    #[serde(default)]
    pub min_value: Option<f64>,

    #[serde(default)]
    pub max_value: Option<f64>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ThresholdEntry {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            min_value: None,
            max_value: None,
            is_active: true,
        }
    }

    /// Set the declared bounds for this row
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    fn in_bounds(&self) -> bool {
        if !self.value.is_finite() {
            return false;
        }
        let above_min = self.min_value.map_or(true, |min| self.value >= min);
        let below_max = self.max_value.map_or(true, |max| self.value <= max);
        above_min && below_max
    }
}

fn default_active() -> bool {
    true
}

/// Thresholds, confidence weights and labels used by the combiner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RiskConfig {
    #[serde(default)]
    pub thresholds: RiskThresholds,

    #[serde(default)]
    pub confidence: ConfidenceWeights,

    #[serde(default)]
    pub labels: RiskLabels,
}

impl RiskConfig {
    pub const IF_ANOMALY_HIGH: &'static str = "IF_Anomaly_High";
    pub const IF_ANOMALY_MEDIUM: &'static str = "IF_Anomaly_Medium";
    pub const IF_ANOMALY_LOW: &'static str = "IF_Anomaly_Low";
    pub const CONFIDENCE_ALL_AGREE: &'static str = "Confidence_AllAgree";
    pub const CONFIDENCE_TWO_AGREE: &'static str = "Confidence_TwoAgree";
    pub const CONFIDENCE_ONE_AGREES: &'static str = "Confidence_OneAgrees";
    pub const CONFIDENCE_HIGH_RISK_BOOST: &'static str = "Confidence_HighRiskBoost";

    /// Build a config from threshold rows.
    ///
    /// Missing names keep their defaults. Inactive rows are skipped and rows
    /// outside their declared bounds are rejected with a warning. The result
    /// must still satisfy [`RiskConfig::validate`].
    pub fn from_thresholds<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ThresholdEntry>,
    {
        let mut config = Self::default();

        for entry in entries {
            if !entry.is_active {
                continue;
            }
            if !entry.in_bounds() {
                log::warn!(
                    "Rejecting threshold {}={} outside bounds [{:?}, {:?}]",
                    entry.name,
                    entry.value,
                    entry.min_value,
                    entry.max_value
                );
                continue;
            }

            let slot = match entry.name.as_str() {
                Self::IF_ANOMALY_HIGH => &mut config.thresholds.high,
                Self::IF_ANOMALY_MEDIUM => &mut config.thresholds.medium,
                Self::IF_ANOMALY_LOW => &mut config.thresholds.low,
                Self::CONFIDENCE_ALL_AGREE => &mut config.confidence.all_agree,
                Self::CONFIDENCE_TWO_AGREE => &mut config.confidence.two_agree,
                Self::CONFIDENCE_ONE_AGREES => &mut config.confidence.one_agrees,
                Self::CONFIDENCE_HIGH_RISK_BOOST => &mut config.confidence.high_risk_boost,
                other => {
                    log::debug!("Ignoring unknown threshold '{}'", other);
                    continue;
                }
            };
            *slot = entry.value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check ordering and ranges
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [("high", t.high), ("medium", t.medium), ("low", t.low)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::InvalidThreshold(format!(
                    "{} threshold must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !(t.low <= t.medium && t.medium <= t.high) {
            return Err(CoreError::InvalidThreshold(format!(
                "thresholds must satisfy low <= medium <= high, got {} / {} / {}",
                t.low, t.medium, t.high
            )));
        }

        let c = &self.confidence;
        for (name, value) in [
            ("all_agree", c.all_agree),
            ("two_agree", c.two_agree),
            ("one_agrees", c.one_agrees),
            ("high_risk_boost", c.high_risk_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::InvalidThreshold(format!(
                    "confidence weight {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Map a score onto a risk level
    pub fn level_for(&self, score: f64) -> RiskLevel {
        let t = &self.thresholds;
        if score >= t.high {
            RiskLevel::High
        } else if score >= t.medium {
            RiskLevel::Medium
        } else if score >= t.low {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }

    /// Display label for a level
    pub fn label(&self, level: RiskLevel) -> &str {
        match level {
            RiskLevel::Safe => &self.labels.safe,
            RiskLevel::Low => &self.labels.low,
            RiskLevel::Medium => &self.labels.medium,
            RiskLevel::High => &self.labels.high,
        }
    }
}
