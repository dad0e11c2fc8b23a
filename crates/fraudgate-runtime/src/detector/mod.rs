//! Statistical anomaly detectors
//!
//! The detector set is closed: an isolation forest and an autoencoder.
//! [`AnomalyDetector`] wraps either one so callers can hold, toggle and run
//! them uniformly.

pub mod autoencoder;
pub mod forest;

pub use autoencoder::{
    Activation, AutoencoderDetector, AutoencoderModel, AutoencoderScore, DenseLayer,
    StandardScaler,
};
pub use forest::{
    ForestDetector, ForestLabel, ForestScore, IsolationForestModel, IsolationTree, TreeNode,
};

use crate::error::Result;
use fraudgate_core::{CheckKind, FeatureMap, RiskConfig};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    IsolationForest,
    Autoencoder,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::IsolationForest => "isolation_forest",
            DetectorKind::Autoencoder => "autoencoder",
        }
    }

    /// Check toggle that enables this detector
    pub fn check(&self) -> CheckKind {
        match self {
            DetectorKind::IsolationForest => CheckKind::IsolationForest,
            DetectorKind::Autoencoder => CheckKind::Autoencoder,
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum AnomalyDetector {
    Forest(ForestDetector),
    Autoencoder(AutoencoderDetector),
}

/// Output of one detector run
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorSignal {
    Forest(ForestScore),
    Autoencoder(AutoencoderScore),
}

impl AnomalyDetector {
    pub fn kind(&self) -> DetectorKind {
        match self {
            AnomalyDetector::Forest(_) => DetectorKind::IsolationForest,
            AnomalyDetector::Autoencoder(_) => DetectorKind::Autoencoder,
        }
    }

    /// Run the detector.
    ///
    /// `Ok(None)` means the detector produced no signal. Errors are returned
    /// for the caller to log and drop.
    pub fn detect(&self, features: &FeatureMap, risk: &RiskConfig) -> Result<Option<DetectorSignal>> {
        match self {
            AnomalyDetector::Forest(detector) => {
                let score = detector.score(features, risk.thresholds.medium)?;
                Ok(Some(DetectorSignal::Forest(score)))
            }
            AnomalyDetector::Autoencoder(detector) => {
                Ok(detector.score(features).map(DetectorSignal::Autoencoder))
            }
        }
    }
}

impl From<ForestDetector> for AnomalyDetector {
    fn from(detector: ForestDetector) -> Self {
        AnomalyDetector::Forest(detector)
    }
}

impl From<AutoencoderDetector> for AnomalyDetector {
    fn from(detector: AutoencoderDetector) -> Self {
        AnomalyDetector::Autoencoder(detector)
    }
}
