//! Builder pattern for FraudEngine

use crate::config::EngineConfig;
use crate::engine::{Collaborators, FraudEngine};
use crate::error::Result;
use crate::providers::{
    BeneficiaryChecker, ConfigStore, InMemoryBeneficiaries, InMemoryConfigStore,
    InMemoryStatistics, InMemoryVelocity, StatisticsProvider, VelocityProvider,
};
use fraudgate_runtime::{
    AutoencoderDetector, DecisionCombiner, FeatureBuilder, FeatureSettings, ForestDetector,
    HybridEngine, MetricsCollector, RuleEngine, RulePolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Builder for FraudEngine
///
/// # Example
///
/// ```rust,ignore
/// use fraudgate_sdk::{EngineConfig, FraudEngineBuilder};
///
/// // From config/fraudgate.yaml and FRAUDGATE_* variables
/// let engine = FraudEngineBuilder::from_config(EngineConfig::load()?)
///     .with_statistics_provider(stats)
///     .with_beneficiary_checker(beneficiaries)
///     .build()
///     .await?;
///
/// // Rules only, in-memory collaborators (for testing)
/// let engine = FraudEngineBuilder::new().build().await?;
/// ```
pub struct FraudEngineBuilder {
    config: EngineConfig,
    statistics: Option<Arc<dyn StatisticsProvider>>,
    velocity: Option<Arc<dyn VelocityProvider>>,
    beneficiaries: Option<Arc<dyn BeneficiaryChecker>>,
    config_store: Option<Arc<dyn ConfigStore>>,
    forest: Option<ForestDetector>,
    autoencoder: Option<AutoencoderDetector>,
}

impl FraudEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::from_config(EngineConfig::new())
    }

    /// Start from a loaded configuration
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            statistics: None,
            velocity: None,
            beneficiaries: None,
            config_store: None,
            forest: None,
            autoencoder: None,
        }
    }

    // ========== Collaborators ==========

    pub fn with_statistics_provider(mut self, provider: Arc<dyn StatisticsProvider>) -> Self {
        self.statistics = Some(provider);
        self
    }

    pub fn with_velocity_provider(mut self, provider: Arc<dyn VelocityProvider>) -> Self {
        self.velocity = Some(provider);
        self
    }

    pub fn with_beneficiary_checker(mut self, checker: Arc<dyn BeneficiaryChecker>) -> Self {
        self.beneficiaries = Some(checker);
        self
    }

    pub fn with_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    // ========== Models ==========

    /// Load the isolation forest from an artifact at build time
    pub fn with_forest_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.forest_model_path = Some(path.into());
        self
    }

    /// Load the autoencoder from an artifact at build time
    pub fn with_autoencoder_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.autoencoder_model_path = Some(path.into());
        self
    }

    /// Use an already loaded forest. Takes precedence over `forest_model_path`.
    pub fn with_forest_detector(mut self, detector: ForestDetector) -> Self {
        self.forest = Some(detector);
        self
    }

    /// Use an already loaded autoencoder. Takes precedence over `autoencoder_model_path`.
    pub fn with_autoencoder_detector(mut self, detector: AutoencoderDetector) -> Self {
        self.autoencoder = Some(detector);
        self
    }

    // ========== Policy and tuning ==========

    pub fn with_rule_policy(mut self, policy: RulePolicy) -> Self {
        self.config.rule_policy = policy;
        self.config.rule_policy_path = None;
        self
    }

    pub fn with_rule_policy_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rule_policy_path = Some(path.into());
        self
    }

    pub fn with_feature_settings(mut self, settings: FeatureSettings) -> Self {
        self.config.features = settings;
        self
    }

    /// How long thresholds and checks are reused before refetching
    pub fn with_config_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.config_cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Bound on cached per-customer check entries
    pub fn with_checks_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.checks_cache_capacity = capacity;
        self
    }

    /// Enable metrics
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Build the fraud engine.
    ///
    /// A forest artifact that fails to load is an error. A missing or broken
    /// autoencoder only degrades the engine.
    pub async fn build(self) -> Result<FraudEngine> {
        self.config.risk.validate()?;
        let policy = self.config.resolve_rule_policy()?;
        policy.validate()?;

        let mut engine = HybridEngine::new(
            RuleEngine::new(policy),
            FeatureBuilder::new(self.config.features.clone()),
            DecisionCombiner::new(self.config.score_weights),
        );

        let forest = match (self.forest, &self.config.forest_model_path) {
            (Some(detector), _) => Some(detector),
            (None, Some(path)) => {
                tracing::info!(path = %path.display(), "Loading isolation forest");
                Some(ForestDetector::from_file(path)?)
            }
            (None, None) => None,
        };
        match forest {
            Some(detector) => engine = engine.with_detector(detector),
            None => tracing::warn!("No isolation forest configured, deciding without it"),
        }

        let autoencoder = match (self.autoencoder, &self.config.autoencoder_model_path) {
            (Some(detector), _) => Some(detector),
            (None, Some(path)) => match AutoencoderDetector::from_file(path) {
                Ok(detector) => {
                    tracing::info!(path = %path.display(), "Loaded autoencoder");
                    Some(detector)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Autoencoder unavailable, deciding without it");
                    None
                }
            },
            (None, None) => None,
        };
        if let Some(detector) = autoencoder {
            engine = engine.with_detector(detector);
        }

        let collaborators = Collaborators {
            statistics: self
                .statistics
                .unwrap_or_else(|| Arc::new(InMemoryStatistics::new())),
            velocity: self
                .velocity
                .unwrap_or_else(|| Arc::new(InMemoryVelocity::new())),
            beneficiaries: self
                .beneficiaries
                .unwrap_or_else(|| Arc::new(InMemoryBeneficiaries::new())),
            config_store: self
                .config_store
                .unwrap_or_else(|| Arc::new(InMemoryConfigStore::new())),
        };

        let metrics = self
            .config
            .enable_metrics
            .then(|| Arc::new(MetricsCollector::new()));

        let fraud_engine = FraudEngine::new(engine, collaborators, metrics, self.config);
        let health = fraud_engine.health();
        tracing::info!(
            status = ?health.status,
            isolation_forest = ?health.models.isolation_forest,
            autoencoder = ?health.models.autoencoder,
            "Fraud engine ready"
        );
        Ok(fraud_engine)
    }
}

impl Default for FraudEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
