//! Isolation forest detector
//!
//! The model artifact is a JSON export of a trained isolation forest: one node
//! array per tree, the subsample size the trees were grown on, the decision
//! offset and the ordered feature names. Scoring follows the standard
//! path-length formulation:
//!
//! ```text
//! s(x)        = 2^(-E[h(x)] / c(n))
//! decision(x) = -s(x) - offset
//! ```
//!
//! A negative decision labels the point an outlier.

use crate::error::{ModelError, Result};
use fraudgate_core::{FeatureMap, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<TreeNode>,
}

impl IsolationTree {
    /// Path length of `x`, including the average-path adjustment at the leaf
    pub fn path_length(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;
        // validated trees are acyclic, so this walk terminates within nodes.len() steps
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { samples } => return depth + average_path_length(*samples),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }

    fn validate(&self, tree_index: usize, width: usize) -> std::result::Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact(format!("tree {} has no nodes", tree_index)));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= width {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree {} node {} splits on feature {} but the schema has {}",
                        tree_index, i, feature, width
                    )));
                }
                // children must point forward so every walk reaches a leaf
                if *left <= i || *right <= i || *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree {} node {} has invalid children {} / {}",
                        tree_index, i, left, right
                    )));
                }
                if threshold.is_nan() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree {} node {} has a NaN threshold",
                        tree_index, i
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Prediction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForestLabel {
    Inlier,
    Outlier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForestModel {
    pub feature_names: Vec<String>,

    /// Subsample size each tree was grown on
    pub max_samples: usize,

    /// Decision offset fitted at training time
    pub offset: f64,

    pub trees: Vec<IsolationTree>,

    #[serde(skip)]
    schema: Option<FeatureSchema>,
}

impl IsolationForestModel {
    pub fn new(
        feature_names: Vec<String>,
        max_samples: usize,
        offset: f64,
        trees: Vec<IsolationTree>,
    ) -> std::result::Result<Self, ModelError> {
        let mut model = Self {
            feature_names,
            max_samples,
            offset,
            trees,
            schema: None,
        };
        model.prepare()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, ModelError> {
        let mut model: IsolationForestModel = serde_json::from_str(json)?;
        model.prepare()?;
        Ok(model)
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn prepare(&mut self) -> std::result::Result<(), ModelError> {
        let schema = FeatureSchema::new("isolation_forest", self.feature_names.clone())?;
        if schema.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no features".to_string()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".to_string()));
        }
        if self.max_samples < 1 {
            return Err(ModelError::InvalidArtifact("max_samples must be at least 1".to_string()));
        }
        if !self.offset.is_finite() {
            return Err(ModelError::InvalidArtifact(format!("offset {} is not finite", self.offset)));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, schema.len())?;
        }
        self.schema = Some(schema);
        Ok(())
    }

    pub fn schema(&self) -> std::result::Result<&FeatureSchema, ModelError> {
        self.schema
            .as_ref()
            .ok_or_else(|| ModelError::InvalidArtifact("forest schema not prepared".to_string()))
    }

    /// Anomaly score `s(x)` in (0, 1]; higher is more anomalous
    pub fn score_samples(&self, x: &[f64]) -> std::result::Result<f64, ModelError> {
        self.schema()?.check_vector(x)?;
        let mean_depth =
            self.trees.iter().map(|tree| tree.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let normalizer = average_path_length(self.max_samples).max(f64::MIN_POSITIVE);
        Ok(2f64.powf(-mean_depth / normalizer))
    }

    /// Signed decision value; negative means outlier
    pub fn decision_function(&self, x: &[f64]) -> std::result::Result<f64, ModelError> {
        Ok(-self.score_samples(x)? - self.offset)
    }

    pub fn predict(&self, x: &[f64]) -> std::result::Result<ForestLabel, ModelError> {
        Ok(if self.decision_function(x)? < 0.0 {
            ForestLabel::Outlier
        } else {
            ForestLabel::Inlier
        })
    }
}

/// Forest output for one transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestScore {
    pub raw_score: f64,
    /// `(raw + 1) / 2` clamped into [0, 1]
    pub normalized_score: f64,
    pub label: ForestLabel,
    pub is_anomaly: bool,
    pub threshold: f64,
    pub reason: Option<String>,
}

/// Normalize a raw decision value into [0, 1]
pub fn normalize_score(raw: f64) -> f64 {
    ((raw + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct ForestDetector {
    model: IsolationForestModel,
}

impl ForestDetector {
    pub fn new(model: IsolationForestModel) -> Self {
        Self { model }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(IsolationForestModel::from_file(path)?))
    }

    pub fn model(&self) -> &IsolationForestModel {
        &self.model
    }

    /// Score a feature map. `threshold` is the medium anomaly threshold from
    /// the active risk configuration.
    pub fn score(&self, features: &FeatureMap, threshold: f64) -> Result<ForestScore> {
        let x = self.model.schema()?.project(features)?;
        let raw_score = self.model.decision_function(&x)?;
        let label = if raw_score < 0.0 {
            ForestLabel::Outlier
        } else {
            ForestLabel::Inlier
        };
        let normalized_score = normalize_score(raw_score);

        let reason = if normalized_score >= threshold {
            Some(format!(
                "ML anomaly detected: risk score {:.4} exceeds threshold {}",
                normalized_score, threshold
            ))
        } else if label == ForestLabel::Outlier {
            Some(format!(
                "ML anomaly detected: abnormal behavior pattern (risk score {:.4})",
                normalized_score
            ))
        } else {
            None
        };

        Ok(ForestScore {
            raw_score,
            normalized_score,
            label,
            is_anomaly: reason.is_some(),
            threshold,
            reason,
        })
    }
}
