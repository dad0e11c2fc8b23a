//! Configuration types for FraudEngine

use crate::cache::DEFAULT_CHECKS_CAPACITY;
use crate::error::{Result, SdkError};
use fraudgate_core::RiskConfig;
use fraudgate_runtime::{FeatureSettings, RulePolicy, ScoreWeights};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the engine config file, without extension
pub const DEFAULT_CONFIG_FILE: &str = "config/fraudgate";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "FRAUDGATE";

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Isolation forest artifact (JSON)
    pub forest_model_path: Option<PathBuf>,

    /// Autoencoder artifact (JSON)
    pub autoencoder_model_path: Option<PathBuf>,

    /// Rule policy file (YAML). Takes precedence over `rule_policy`.
    pub rule_policy_path: Option<PathBuf>,

    /// Inline rule policy
    pub rule_policy: RulePolicy,

    /// Feature builder settings
    pub features: FeatureSettings,

    /// Base scores and detector weights used by the combiner
    pub score_weights: ScoreWeights,

    /// Risk configuration used until the config store answers
    pub risk: RiskConfig,

    /// How long fetched thresholds and checks are reused, in seconds
    pub config_cache_ttl_secs: u64,

    /// Most (customer, account, transfer type) check entries kept in memory
    pub checks_cache_capacity: usize,

    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            forest_model_path: None,
            autoencoder_model_path: None,
            rule_policy_path: None,
            rule_policy: RulePolicy::default(),
            features: FeatureSettings::default(),
            score_weights: ScoreWeights::default(),
            risk: RiskConfig::default(),
            config_cache_ttl_secs: 300,
            checks_cache_capacity: DEFAULT_CHECKS_CAPACITY,
            enable_metrics: true,
        }
    }

    /// Load configuration from `config/fraudgate.*` and `FRAUDGATE_*` variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from the given file (optional) and environment.
    ///
    /// A missing file means defaults plus environment overrides. A file that
    /// exists but cannot be parsed is an error.
    pub fn load_from(file: &str) -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| SdkError::ConfigError(format!("Failed to read config {}: {}", file, e)))?;

        let loaded: EngineConfig = cfg
            .try_deserialize()
            .map_err(|e| SdkError::ConfigError(format!("Failed to deserialize config: {}", e)))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check the inline policy and risk configuration
    pub fn validate(&self) -> Result<()> {
        self.rule_policy.validate()?;
        self.risk.validate()?;
        Ok(())
    }

    /// Resolve the rule policy, reading `rule_policy_path` when set
    pub fn resolve_rule_policy(&self) -> Result<RulePolicy> {
        match &self.rule_policy_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading rule policy");
                Ok(RulePolicy::from_file(path)?)
            }
            None => Ok(self.rule_policy.clone()),
        }
    }

    /// Set the isolation forest artifact
    pub fn with_forest_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.forest_model_path = Some(path.into());
        self
    }

    /// Set the autoencoder artifact
    pub fn with_autoencoder_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.autoencoder_model_path = Some(path.into());
        self
    }

    /// Set the rule policy file
    pub fn with_rule_policy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_policy_path = Some(path.into());
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
