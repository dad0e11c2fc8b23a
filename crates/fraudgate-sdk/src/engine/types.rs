//! Response types for FraudEngine

use crate::error::Result;
use chrono::{DateTime, Utc};
use fraudgate_core::{DecisionResult, IndividualScores};
use serde::{Deserialize, Serialize};

/// Decision response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    /// Transaction ID (for tracking and correlation)
    pub transaction_id: String,

    pub customer_id: String,

    /// Decision result
    pub result: DecisionResult,

    /// Per-detector breakdown
    pub individual_scores: IndividualScores,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    pub decided_at: DateTime<Utc>,
}

impl DecisionResponse {
    /// Render as pretty-printed JSON for audit logs
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load state of one model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Loaded,
    Unavailable,
}

impl ModelState {
    pub(crate) fn from_loaded(loaded: bool) -> Self {
        if loaded {
            ModelState::Loaded
        } else {
            ModelState::Unavailable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHealth {
    pub isolation_forest: ModelState,
    pub autoencoder: ModelState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Every model is loaded
    Healthy,
    /// Deciding with rules and a subset of models
    Degraded,
}

/// Health summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub models: ModelHealth,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_serialization() {
        let health = HealthStatus {
            status: ServiceStatus::Degraded,
            models: ModelHealth {
                isolation_forest: ModelState::Loaded,
                autoencoder: ModelState::Unavailable,
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["models"]["isolation_forest"], "loaded");
        assert_eq!(json["models"]["autoencoder"], "unavailable");
    }
}
