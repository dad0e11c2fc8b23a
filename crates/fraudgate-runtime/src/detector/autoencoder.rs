//! Autoencoder detector
//!
//! A dense autoencoder exported as JSON: feature names, a standard scaler,
//! the layer stack and the reconstruction-error threshold chosen at training
//! time. The reconstruction error is the mean squared error between the
//! scaled input and the network output.

use crate::error::ModelError;
use fraudgate_core::{FeatureMap, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Fully connected layer. `weights` is `[output][input]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn input_width(&self) -> usize {
        self.weights.first().map_or(0, |row| row.len())
    }

    pub fn output_width(&self) -> usize {
        self.weights.len()
    }

    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Per-feature standardization fitted on the training set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| {
                // zero-variance columns were constant in training
                if *scale == 0.0 {
                    value - mean
                } else {
                    (value - mean) / scale
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderModel {
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub layers: Vec<DenseLayer>,
    pub threshold: f64,

    #[serde(skip)]
    schema: Option<FeatureSchema>,
}

impl AutoencoderModel {
    pub fn new(
        feature_names: Vec<String>,
        scaler: StandardScaler,
        layers: Vec<DenseLayer>,
        threshold: f64,
    ) -> Result<Self, ModelError> {
        let mut model = Self {
            feature_names,
            scaler,
            layers,
            threshold,
            schema: None,
        };
        model.prepare()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let mut model: AutoencoderModel = serde_json::from_str(json)?;
        model.prepare()?;
        Ok(model)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn prepare(&mut self) -> Result<(), ModelError> {
        let schema = FeatureSchema::new("autoencoder", self.feature_names.clone())?;
        let width = schema.len();
        if width == 0 {
            return Err(ModelError::InvalidArtifact("autoencoder has no features".to_string()));
        }
        if self.scaler.mean.len() != width || self.scaler.scale.len() != width {
            return Err(ModelError::InvalidArtifact(format!(
                "scaler has {} means and {} scales for {} features",
                self.scaler.mean.len(),
                self.scaler.scale.len(),
                width
            )));
        }
        if self.layers.is_empty() {
            return Err(ModelError::InvalidArtifact("autoencoder has no layers".to_string()));
        }

        let mut expected = width;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.bias.len() != layer.output_width() {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer {} has {} outputs but {} biases",
                    i,
                    layer.output_width(),
                    layer.bias.len()
                )));
            }
            if layer.weights.iter().any(|row| row.len() != expected) {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer {} expects {} inputs",
                    i, expected
                )));
            }
            expected = layer.output_width();
        }
        if expected != width {
            return Err(ModelError::InvalidArtifact(format!(
                "autoencoder reconstructs {} values for {} features",
                expected, width
            )));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ModelError::InvalidArtifact(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }

        self.schema = Some(schema);
        Ok(())
    }

    pub fn schema(&self) -> Result<&FeatureSchema, ModelError> {
        self.schema
            .as_ref()
            .ok_or_else(|| ModelError::InvalidArtifact("autoencoder schema not prepared".to_string()))
    }

    /// Mean squared error between the scaled input and its reconstruction
    pub fn reconstruction_error(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.schema()?.check_vector(x)?;
        let scaled = self.scaler.transform(x);
        let output = self
            .layers
            .iter()
            .fold(scaled.clone(), |activations, layer| layer.forward(&activations));

        let error = scaled
            .iter()
            .zip(&output)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            / scaled.len() as f64;

        if !error.is_finite() {
            return Err(ModelError::InvalidArtifact(format!(
                "reconstruction error is not finite: {}",
                error
            )));
        }
        Ok(error)
    }
}

/// Autoencoder output for one transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderScore {
    pub reconstruction_error: f64,
    pub threshold: f64,
    pub is_anomaly: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AutoencoderDetector {
    model: AutoencoderModel,
}

impl AutoencoderDetector {
    pub fn new(model: AutoencoderModel) -> Self {
        Self { model }
    }

    pub fn from_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        Ok(Self::new(AutoencoderModel::from_file(path)?))
    }

    pub fn model(&self) -> &AutoencoderModel {
        &self.model
    }

    pub fn threshold(&self) -> f64 {
        self.model.threshold
    }

    /// Score a feature map. A failure yields `None`: the autoencoder then
    /// contributes no signal to the decision.
    pub fn score(&self, features: &FeatureMap) -> Option<AutoencoderScore> {
        match self.try_score(features) {
            Ok(score) => Some(score),
            Err(e) => {
                tracing::warn!(error = %e, "Autoencoder scoring failed, treating as absent");
                None
            }
        }
    }

    pub fn try_score(&self, features: &FeatureMap) -> Result<AutoencoderScore, ModelError> {
        let x = self.model.schema()?.project(features)?;
        let reconstruction_error = self.model.reconstruction_error(&x)?;
        let threshold = self.model.threshold;
        let is_anomaly = reconstruction_error > threshold;

        let reason = is_anomaly.then(|| {
            format!(
                "Autoencoder anomaly: reconstruction error {:.4} exceeds threshold {:.4} ({:.1}x normal)",
                reconstruction_error,
                threshold,
                reconstruction_error / threshold
            )
        });

        Ok(AutoencoderScore {
            reconstruction_error,
            threshold,
            is_anomaly,
            reason,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Identity network on two features: reconstruction error is zero for any
    /// input, so tests control the error through the scaler instead.
    pub(crate) fn identity_model(threshold: f64) -> AutoencoderModel {
        AutoencoderModel::new(
            vec!["transaction_amount".to_string(), "txn_count_10min".to_string()],
            StandardScaler {
                mean: vec![5000.0, 1.0],
                scale: vec![2000.0, 1.0],
            },
            vec![DenseLayer {
                weights: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            }],
            threshold,
        )
        .unwrap()
    }

    /// Network that always reconstructs the training mean
    pub(crate) fn mean_model(threshold: f64) -> AutoencoderModel {
        AutoencoderModel::new(
            vec!["transaction_amount".to_string(), "txn_count_10min".to_string()],
            StandardScaler {
                mean: vec![5000.0, 1.0],
                scale: vec![2000.0, 1.0],
            },
            vec![DenseLayer {
                weights: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            }],
            threshold,
        )
        .unwrap()
    }

    fn features(amount: f64, count: f64) -> FeatureMap {
        [("transaction_amount", amount), ("txn_count_10min", count)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_identity_reconstructs_perfectly() {
        let model = identity_model(0.5);
        assert_eq!(model.reconstruction_error(&[90000.0, 7.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_mean_model_error() {
        let model = mean_model(0.5);
        // scaled input (2.0, 1.0) against (0, 0): (4 + 1) / 2
        assert_eq!(model.reconstruction_error(&[9000.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_detector_flags_large_error() {
        let detector = AutoencoderDetector::new(mean_model(1.0));
        let score = detector.score(&features(9000.0, 2.0)).unwrap();
        assert!(score.is_anomaly);
        assert_eq!(score.threshold, 1.0);
        assert!(score.reason.unwrap().starts_with("Autoencoder anomaly"));

        let score = detector.score(&features(5000.0, 1.0)).unwrap();
        assert!(!score.is_anomaly);
        assert!(score.reason.is_none());
    }

    #[test]
    fn test_missing_feature_is_absent_signal() {
        let detector = AutoencoderDetector::new(mean_model(1.0));
        let mut map = FeatureMap::new();
        map.insert("transaction_amount", 10.0);
        assert!(detector.score(&map).is_none());
        assert!(matches!(detector.try_score(&map), Err(ModelError::Schema(_))));
    }

    #[test]
    fn test_relu_and_sigmoid() {
        assert_eq!(Activation::Relu.apply(-2.0), 0.0);
        assert_eq!(Activation::Relu.apply(2.0), 2.0);
        assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let json = r#"{
            "feature_names": ["a", "b"],
            "scaler": {"mean": [0.0, 0.0], "scale": [1.0, 1.0]},
            "layers": [
                {"weights": [[1.0, 0.0]], "bias": [0.0], "activation": "relu"}
            ],
            "threshold": 0.3
        }"#;
        assert!(matches!(
            AutoencoderModel::from_json(json),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_artifact_json() {
        let json = r#"{
            "feature_names": ["a", "b"],
            "scaler": {"mean": [0.0, 0.0], "scale": [1.0, 1.0]},
            "layers": [
                {"weights": [[0.5, 0.5]], "bias": [0.0], "activation": "tanh"},
                {"weights": [[1.0], [1.0]], "bias": [0.0, 0.0], "activation": "linear"}
            ],
            "threshold": 0.3
        }"#;
        let model = AutoencoderModel::from_json(json).unwrap();
        assert_eq!(model.schema().unwrap().len(), 2);
        assert!(model.reconstruction_error(&[0.1, -0.1]).unwrap() >= 0.0);
    }
}
