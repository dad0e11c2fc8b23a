//! Named feature maps and model feature schemas
//!
//! Models never consume positional vectors built by hand. Feature builders
//! produce a [`FeatureMap`] keyed by name and each model projects it through
//! the [`FeatureSchema`] it was trained with.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Feature schema validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Missing feature '{feature}' required by schema '{schema}'")]
    MissingFeature { schema: String, feature: String },

    #[error("Schema '{schema}' expects {expected} features, got {actual}")]
    LengthMismatch {
        schema: String,
        expected: usize,
        actual: usize,
    },

    #[error("Feature '{feature}' is not a finite number: {value}")]
    NonFinite { feature: String, value: f64 },

    #[error("Duplicate feature '{0}' in schema")]
    DuplicateFeature(String),
}

/// Feature values keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMap(BTreeMap<String, f64>);

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Insert a boolean as 0/1
    pub fn insert_flag(&mut self, name: impl Into<String>, flag: bool) {
        self.insert(name, if flag { 1.0 } else { 0.0 });
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureMap {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Ordered list of feature names a model was trained with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub features: Vec<String>,
}

impl FeatureSchema {
    pub fn new(name: impl Into<String>, features: Vec<String>) -> Result<Self, SchemaError> {
        let schema = Self {
            name: name.into(),
            features,
        };
        schema.check_unique()?;
        Ok(schema)
    }

    /// Reject schemas that name a feature twice
    pub fn check_unique(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.features.len());
        for feature in &self.features {
            if !seen.insert(feature.as_str()) {
                return Err(SchemaError::DuplicateFeature(feature.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Project a feature map onto this schema's column order.
    ///
    /// Every schema feature must be present and finite. Extra features in the
    /// map are ignored.
    pub fn project(&self, features: &FeatureMap) -> Result<Vec<f64>, SchemaError> {
        self.features
            .iter()
            .map(|name| match features.get(name) {
                Some(value) if value.is_finite() => Ok(value),
                Some(value) => Err(SchemaError::NonFinite {
                    feature: name.clone(),
                    value,
                }),
                None => Err(SchemaError::MissingFeature {
                    schema: self.name.clone(),
                    feature: name.clone(),
                }),
            })
            .collect()
    }

    /// Check a positional vector against this schema's width
    pub fn check_vector(&self, vector: &[f64]) -> Result<(), SchemaError> {
        if vector.len() != self.features.len() {
            return Err(SchemaError::LengthMismatch {
                schema: self.name.clone(),
                expected: self.features.len(),
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            "forest",
            vec!["amount".to_string(), "transfer_type_encoded".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_project_follows_schema_order() {
        let map: FeatureMap = [("transfer_type_encoded", 4.0), ("amount", 50000.0), ("extra", 1.0)]
            .into_iter()
            .collect();
        assert_eq!(schema().project(&map).unwrap(), vec![50000.0, 4.0]);
    }

    #[test]
    fn test_project_missing_feature() {
        let mut map = FeatureMap::new();
        map.insert("amount", 10.0);
        let err = schema().project(&map).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingFeature {
                schema: "forest".to_string(),
                feature: "transfer_type_encoded".to_string(),
            }
        );
    }

    #[test]
    fn test_project_non_finite() {
        let mut map = FeatureMap::new();
        map.insert("amount", f64::NAN);
        map.insert("transfer_type_encoded", 1.0);
        assert!(matches!(
            schema().project(&map),
            Err(SchemaError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let err = FeatureSchema::new("ae", vec!["a".to_string(), "a".to_string()]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateFeature("a".to_string()));
    }

    #[test]
    fn test_check_vector_length() {
        assert!(schema().check_vector(&[1.0, 2.0]).is_ok());
        assert!(matches!(
            schema().check_vector(&[1.0]),
            Err(SchemaError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_insert_flag() {
        let mut map = FeatureMap::new();
        map.insert_flag("is_night", true);
        map.insert_flag("is_weekend", false);
        assert_eq!(map.get("is_night"), Some(1.0));
        assert_eq!(map.get("is_weekend"), Some(0.0));
    }
}
