//! Core FraudEngine implementation

use super::types::{DecisionResponse, HealthStatus, ModelHealth, ModelState, ServiceStatus};
use crate::cache::{ChecksCache, RiskConfigCache};
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use crate::providers::{BeneficiaryChecker, ConfigStore, StatisticsProvider, VelocityProvider};
use crate::request::TransferRequest;
use chrono::Utc;
use fraudgate_core::{Transaction, UserStatistics, VelocitySnapshot};
use fraudgate_runtime::{DetectorKind, HybridEngine, Metrics, MetricsCollector, TypeLimit};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Collaborators the engine awaits on every decision
pub(crate) struct Collaborators {
    pub statistics: Arc<dyn StatisticsProvider>,
    pub velocity: Arc<dyn VelocityProvider>,
    pub beneficiaries: Arc<dyn BeneficiaryChecker>,
    pub config_store: Arc<dyn ConfigStore>,
}

pub struct FraudEngine {
    /// Rules, detectors and combiner
    engine: HybridEngine,

    collaborators: Collaborators,

    risk_cache: RiskConfigCache,

    checks_cache: ChecksCache,

    /// Metrics collector
    metrics: Option<Arc<MetricsCollector>>,

    /// Configuration
    config: EngineConfig,
}

impl FraudEngine {
    /// Generate a transaction ID
    /// Format: txn_xxxxxxxx
    fn generate_transaction_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("txn_{}", &id[..8])
    }

    pub(crate) fn new(
        engine: HybridEngine,
        collaborators: Collaborators,
        metrics: Option<Arc<MetricsCollector>>,
        config: EngineConfig,
    ) -> Self {
        let ttl = Duration::from_secs(config.config_cache_ttl_secs);
        let engine = match &metrics {
            Some(metrics) => engine.with_metrics(metrics.clone()),
            None => engine,
        };
        Self {
            engine,
            collaborators,
            risk_cache: RiskConfigCache::new(ttl, config.risk.clone()),
            checks_cache: ChecksCache::with_capacity(ttl, config.checks_cache_capacity),
            metrics,
            config,
        }
    }

    /// Screen one transfer
    pub async fn decide(&self, request: &TransferRequest) -> Result<DecisionResponse> {
        let started = Instant::now();

        if let Err(e) = request.validate() {
            self.record_error("invalid_request");
            return Err(e);
        }

        let customer = request.customer_id.as_str();
        let account = request.from_account_no.as_str();

        let (stats, velocity, is_new_beneficiary) = tokio::join!(
            self.load_statistics(customer, account),
            self.load_velocity(customer, account),
            self.check_beneficiary(customer, &request.to_account_no),
        );
        let is_new_beneficiary = is_new_beneficiary?;

        let checks = self
            .checks_cache
            .get(
                self.collaborators.config_store.as_ref(),
                customer,
                account,
                request.transfer_type,
            )
            .await;
        let risk = self
            .risk_cache
            .get(self.collaborators.config_store.as_ref())
            .await;

        let txn = Self::build_transaction(request, &velocity, is_new_beneficiary);
        let result = self.engine.decide(&txn, &stats, &checks, &risk)?;

        let transaction_id = Self::generate_transaction_id();
        tracing::info!(
            transaction_id = %transaction_id,
            customer = customer,
            transfer_type = %request.transfer_type,
            risk_score = result.risk_score,
            risk_level = %result.risk_level,
            advice = ?result.advice,
            "Transfer screened"
        );

        Ok(DecisionResponse {
            transaction_id,
            customer_id: request.customer_id.clone(),
            individual_scores: result.individual_scores(),
            result,
            processing_time_ms: started.elapsed().as_millis() as u64,
            decided_at: Utc::now(),
        })
    }

    /// Assemble the engine input. Provider counters exclude this transfer.
    fn build_transaction(
        request: &TransferRequest,
        velocity: &VelocitySnapshot,
        is_new_beneficiary: Option<bool>,
    ) -> Transaction {
        let mut txn = Transaction::new(request.amount, request.transfer_type)
            .with_bank_country(request.bank_country.clone())
            .with_velocity(
                velocity.txn_count_30s.saturating_add(1),
                velocity.txn_count_10min.saturating_add(1),
                velocity.txn_count_1hour.saturating_add(1),
            )
            .with_time_since_last(velocity.time_since_last_txn);
        txn.is_new_beneficiary = is_new_beneficiary;
        txn.initiated_at = request.initiated_at;
        txn
    }

    async fn load_statistics(&self, customer: &str, account: &str) -> UserStatistics {
        match self.collaborators.statistics.user_statistics(customer, account).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(customer = customer, error = %e, "Statistics unavailable, using default profile");
                self.record_error("statistics_unavailable");
                UserStatistics::default()
            }
        }
    }

    async fn load_velocity(&self, customer: &str, account: &str) -> VelocitySnapshot {
        match self.collaborators.velocity.velocity(customer, account).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(customer = customer, error = %e, "Velocity unavailable, assuming no recent activity");
                self.record_error("velocity_unavailable");
                VelocitySnapshot::default()
            }
        }
    }

    /// Beneficiary novelty. A transfer without a recipient account has no
    /// history to match, so it counts as a new beneficiary.
    async fn check_beneficiary(&self, customer: &str, recipient: &str) -> Result<Option<bool>> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            tracing::debug!(customer = customer, "No recipient account, treating as new beneficiary");
            return Ok(Some(true));
        }
        match self
            .collaborators
            .beneficiaries
            .is_new_beneficiary(customer, recipient)
            .await
        {
            Ok(is_new) => Ok(Some(is_new)),
            Err(e) => {
                tracing::error!(customer = customer, error = %e, "Beneficiary check failed");
                self.record_error("beneficiary_unavailable");
                Err(SdkError::ServiceUnavailable(format!(
                    "beneficiary check failed: {}",
                    e
                )))
            }
        }
    }

    fn record_error(&self, error_type: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_error(error_type);
        }
    }

    /// Report which models are loaded
    pub fn health(&self) -> HealthStatus {
        let models = ModelHealth {
            isolation_forest: ModelState::from_loaded(
                self.engine.has_detector(DetectorKind::IsolationForest),
            ),
            autoencoder: ModelState::from_loaded(self.engine.has_detector(DetectorKind::Autoencoder)),
        };
        let status = if models.isolation_forest == ModelState::Loaded
            && models.autoencoder == ModelState::Loaded
        {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        };
        HealthStatus {
            status,
            models,
            timestamp: Utc::now(),
        }
    }

    /// Amount ceiling for every transfer type given a spending profile
    pub fn limits_for_all(&self, avg: f64, std: f64) -> Vec<TypeLimit> {
        self.engine.rules().limits().limits_for_all(avg, std)
    }

    /// Amount ceilings for one customer's account
    pub async fn customer_limits(&self, customer_id: &str, account_no: &str) -> Vec<TypeLimit> {
        let stats = self.load_statistics(customer_id, account_no).await;
        self.limits_for_all(stats.avg_amount, stats.std_amount)
    }

    /// Drop cached thresholds and checks so the next decision refetches them
    pub async fn invalidate_config(&self) {
        self.risk_cache.invalidate().await;
        self.checks_cache.clear();
        tracing::info!("Configuration cache invalidated");
    }

    /// Drop cached checks for one customer
    pub fn invalidate_customer(&self, customer_id: &str) {
        self.checks_cache.invalidate_customer(customer_id);
    }

    /// Get metrics collector
    pub fn metrics(&self) -> Option<Arc<MetricsCollector>> {
        self.metrics.clone()
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
