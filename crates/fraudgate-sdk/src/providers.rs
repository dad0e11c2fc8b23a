//! Collaborator interfaces and in-memory implementations
//!
//! The engine reads customer history, recent activity, beneficiary novelty and
//! per-customer configuration through these traits. Implementations own their
//! I/O; the engine only awaits them.
//!
//! The in-memory implementations are suitable for tests and demos. Data is
//! lost when the process exits.

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use fraudgate_core::{CheckSetting, ThresholdEntry, TransferType, UserStatistics, VelocitySnapshot};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Source of per-customer spending statistics
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    /// Statistics for one (customer, source account) pair.
    ///
    /// Unknown customers should get a zero-history profile rather than an error.
    async fn user_statistics(&self, customer_id: &str, account_no: &str) -> Result<UserStatistics>;
}

/// Source of recent activity counters
#[async_trait]
pub trait VelocityProvider: Send + Sync {
    /// Counters for one (customer, source account) pair, excluding the
    /// transfer being decided
    async fn velocity(&self, customer_id: &str, account_no: &str) -> Result<VelocitySnapshot>;
}

/// Beneficiary novelty lookup
#[async_trait]
pub trait BeneficiaryChecker: Send + Sync {
    /// True when the customer has never paid this recipient
    async fn is_new_beneficiary(&self, customer_id: &str, recipient: &str) -> Result<bool>;
}

/// Hot-reloadable configuration rows
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Check rows for one (customer, account, transfer type). An empty list
    /// means every check is enabled.
    async fn checks(
        &self,
        customer_id: &str,
        account_no: &str,
        transfer_type: TransferType,
    ) -> Result<Vec<CheckSetting>>;

    /// Global threshold rows
    async fn thresholds(&self) -> Result<Vec<ThresholdEntry>>;
}

type AccountKey = (String, String);

fn account_key(customer_id: &str, account_no: &str) -> AccountKey {
    (customer_id.to_string(), account_no.to_string())
}

/// In-memory statistics keyed by (customer, account)
#[derive(Debug, Default)]
pub struct InMemoryStatistics {
    stats: DashMap<AccountKey, UserStatistics>,
}

impl InMemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer_id: &str, account_no: &str, stats: UserStatistics) {
        self.stats.insert(account_key(customer_id, account_no), stats);
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[async_trait]
impl StatisticsProvider for InMemoryStatistics {
    async fn user_statistics(&self, customer_id: &str, account_no: &str) -> Result<UserStatistics> {
        match self.stats.get(&account_key(customer_id, account_no)) {
            Some(stats) => Ok(stats.clone()),
            None => {
                tracing::debug!(customer = customer_id, "No statistics on record, using default profile");
                Ok(UserStatistics::default())
            }
        }
    }
}

/// In-memory velocity counters keyed by (customer, account)
#[derive(Debug, Default)]
pub struct InMemoryVelocity {
    snapshots: DashMap<AccountKey, VelocitySnapshot>,
}

impl InMemoryVelocity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer_id: &str, account_no: &str, snapshot: VelocitySnapshot) {
        self.snapshots.insert(account_key(customer_id, account_no), snapshot);
    }

    /// Count a completed transfer in every window and reset the idle timer
    pub fn record_transfer(&self, customer_id: &str, account_no: &str) {
        let mut entry = self
            .snapshots
            .entry(account_key(customer_id, account_no))
            .or_default();
        entry.txn_count_30s += 1;
        entry.txn_count_10min += 1;
        entry.txn_count_1hour += 1;
        entry.time_since_last_txn = 0.0;
    }
}

#[async_trait]
impl VelocityProvider for InMemoryVelocity {
    async fn velocity(&self, customer_id: &str, account_no: &str) -> Result<VelocitySnapshot> {
        Ok(self
            .snapshots
            .get(&account_key(customer_id, account_no))
            .map(|snapshot| *snapshot)
            .unwrap_or_default())
    }
}

/// Known recipients per customer
#[derive(Debug, Default)]
pub struct InMemoryBeneficiaries {
    known: DashMap<String, HashSet<String>>,
}

impl InMemoryBeneficiaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a recipient as previously paid by the customer
    pub fn add_known(&self, customer_id: &str, recipient: &str) {
        self.known
            .entry(customer_id.to_string())
            .or_default()
            .insert(recipient.to_string());
    }
}

#[async_trait]
impl BeneficiaryChecker for InMemoryBeneficiaries {
    async fn is_new_beneficiary(&self, customer_id: &str, recipient: &str) -> Result<bool> {
        Ok(self
            .known
            .get(customer_id)
            .map_or(true, |known| !known.contains(recipient)))
    }
}

type ChecksKey = (String, String, TransferType);

/// In-memory configuration store
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    checks: DashMap<ChecksKey, Vec<CheckSetting>>,
    thresholds: RwLock<Vec<ThresholdEntry>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the check rows for one (customer, account, transfer type)
    pub fn set_checks(
        &self,
        customer_id: &str,
        account_no: &str,
        transfer_type: TransferType,
        settings: Vec<CheckSetting>,
    ) {
        self.checks.insert(
            (customer_id.to_string(), account_no.to_string(), transfer_type),
            settings,
        );
    }

    /// Replace all threshold rows
    pub async fn set_thresholds(&self, entries: Vec<ThresholdEntry>) {
        *self.thresholds.write().await = entries;
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn checks(
        &self,
        customer_id: &str,
        account_no: &str,
        transfer_type: TransferType,
    ) -> Result<Vec<CheckSetting>> {
        let key = (customer_id.to_string(), account_no.to_string(), transfer_type);
        Ok(self
            .checks
            .get(&key)
            .map(|settings| settings.clone())
            .unwrap_or_default())
    }

    async fn thresholds(&self) -> Result<Vec<ThresholdEntry>> {
        Ok(self.thresholds.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_customer_gets_default_profile() {
        let provider = InMemoryStatistics::new();
        let stats = provider.user_statistics("C404", "A1").await.unwrap();
        assert_eq!(stats, UserStatistics::default());
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn test_statistics_are_per_account() {
        let provider = InMemoryStatistics::new();
        let mut stats = UserStatistics::default();
        stats.avg_amount = 12000.0;
        provider.insert("C1", "A1", stats);

        assert_eq!(provider.user_statistics("C1", "A1").await.unwrap().avg_amount, 12000.0);
        assert_eq!(provider.user_statistics("C1", "A2").await.unwrap().avg_amount, 5000.0);
    }

    #[tokio::test]
    async fn test_record_transfer_increments_windows() {
        let provider = InMemoryVelocity::new();
        provider.record_transfer("C1", "A1");
        provider.record_transfer("C1", "A1");

        let snapshot = provider.velocity("C1", "A1").await.unwrap();
        assert_eq!(snapshot.txn_count_10min, 2);
        assert_eq!(snapshot.txn_count_1hour, 2);
        assert_eq!(snapshot.time_since_last_txn, 0.0);

        let idle = provider.velocity("C2", "A1").await.unwrap();
        assert_eq!(idle, VelocitySnapshot::default());
    }

    #[tokio::test]
    async fn test_beneficiary_novelty() {
        let checker = InMemoryBeneficiaries::new();
        checker.add_known("C1", "AE070331234567890123456");

        assert!(!checker.is_new_beneficiary("C1", "AE070331234567890123456").await.unwrap());
        assert!(checker.is_new_beneficiary("C1", "GB29NWBK60161331926819").await.unwrap());
        assert!(checker.is_new_beneficiary("C2", "AE070331234567890123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_config_store_rows() {
        let store = InMemoryConfigStore::new();
        assert!(store.checks("C1", "A1", TransferType::Overseas).await.unwrap().is_empty());

        store.set_checks(
            "C1",
            "A1",
            TransferType::Overseas,
            vec![CheckSetting::new("velocity_check_10min", false)],
        );
        store
            .set_thresholds(vec![ThresholdEntry::new("IF_Anomaly_High", 0.9)])
            .await;

        assert_eq!(store.checks("C1", "A1", TransferType::Overseas).await.unwrap().len(), 1);
        assert!(store.checks("C1", "A1", TransferType::OwnAccount).await.unwrap().is_empty());
        assert_eq!(store.thresholds().await.unwrap()[0].value, 0.9);
    }
}
