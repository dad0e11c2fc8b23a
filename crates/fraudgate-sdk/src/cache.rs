//! TTL-bounded configuration snapshots
//!
//! Thresholds and check rows change rarely but are read on every decision.
//! Both are fetched from the [`ConfigStore`] and reused until their TTL runs
//! out. A refresh builds a fresh immutable snapshot and swaps it in, so a
//! decision in flight keeps the snapshot it started with.

use crate::providers::ConfigStore;
use dashmap::DashMap;
use fraudgate_core::{ChecksConfig, RiskConfig, TransferType};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// Cached value with its load time
#[derive(Debug, Clone)]
struct CachedSnapshot<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

impl<T> CachedSnapshot<T> {
    fn new(value: Arc<T>) -> Self {
        Self {
            value,
            loaded_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.loaded_at.elapsed() < ttl
    }
}

/// Risk configuration snapshot shared by all decisions
pub struct RiskConfigCache {
    ttl: Duration,
    fallback: Arc<RiskConfig>,
    current: RwLock<Option<CachedSnapshot<RiskConfig>>>,
    /// Held by the one task fetching from the store
    refresh: Mutex<()>,
}

impl RiskConfigCache {
    /// `fallback` is served until the store has answered once
    pub fn new(ttl: Duration, fallback: RiskConfig) -> Self {
        Self {
            ttl,
            fallback: Arc::new(fallback),
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Current snapshot, refreshed from the store when stale.
    ///
    /// One task fetches at a time and no lock is held while the store is
    /// awaited. While a refresh is running other callers get the stale
    /// snapshot; only callers with nothing cached wait for it. A failed
    /// refresh keeps serving the last good snapshot.
    pub async fn get(&self, store: &dyn ConfigStore) -> Arc<RiskConfig> {
        let stale = match self.fresh_or_stale().await {
            Ok(fresh) => return fresh,
            Err(stale) => stale,
        };

        let _refresh = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => match stale {
                Some(value) => return value,
                None => self.refresh.lock().await,
            },
        };
        // Another task may have refreshed while we waited
        let stale = match self.fresh_or_stale().await {
            Ok(fresh) => return fresh,
            Err(stale) => stale,
        };

        let rows = match store.thresholds().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "Threshold refresh failed, keeping previous configuration");
                return stale.unwrap_or_else(|| self.fallback.clone());
            }
        };

        match RiskConfig::from_thresholds(&rows) {
            Ok(config) => {
                tracing::debug!(rows = rows.len(), "Risk configuration refreshed");
                let value = Arc::new(config);
                *self.current.write().await = Some(CachedSnapshot::new(value.clone()));
                value
            }
            Err(e) => {
                tracing::warn!(error = %e, "Threshold rows rejected, keeping previous configuration");
                stale.unwrap_or_else(|| self.fallback.clone())
            }
        }
    }

    /// Drop the snapshot so the next call refetches
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// `Ok` with a fresh snapshot, or `Err` with whatever stale value is held
    async fn fresh_or_stale(&self) -> std::result::Result<Arc<RiskConfig>, Option<Arc<RiskConfig>>> {
        match self.current.read().await.as_ref() {
            Some(snapshot) if snapshot.is_fresh(self.ttl) => Ok(snapshot.value.clone()),
            Some(snapshot) => Err(Some(snapshot.value.clone())),
            None => Err(None),
        }
    }
}

type ChecksKey = (String, String, TransferType);

/// Default bound on cached (customer, account, transfer type) entries
pub const DEFAULT_CHECKS_CAPACITY: usize = 10_000;

/// Per (customer, account, transfer type) check toggles.
///
/// Holds at most `capacity` entries. When full, expired entries are swept;
/// if none have expired the new entry is served without being cached.
pub struct ChecksCache {
    ttl: Duration,
    capacity: usize,
    entries: DashMap<ChecksKey, CachedSnapshot<ChecksConfig>>,
}

impl ChecksCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CHECKS_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: DashMap::new(),
        }
    }

    /// Checks for one key, fetched from the store when missing or stale.
    ///
    /// A failed fetch falls back to the stale entry, or to all checks enabled.
    pub async fn get(
        &self,
        store: &dyn ConfigStore,
        customer_id: &str,
        account_no: &str,
        transfer_type: TransferType,
    ) -> ChecksConfig {
        let key = (customer_id.to_string(), account_no.to_string(), transfer_type);
        let stale = match self.entries.get(&key) {
            Some(entry) if entry.is_fresh(self.ttl) => return *entry.value,
            Some(entry) => Some(*entry.value),
            None => None,
        };

        match store.checks(customer_id, account_no, transfer_type).await {
            Ok(rows) => {
                let checks = ChecksConfig::from_settings(&rows);
                self.store_entry(key, checks);
                checks
            }
            Err(e) => {
                tracing::warn!(
                    customer = customer_id,
                    error = %e,
                    "Check configuration unavailable, enabling all checks"
                );
                stale.unwrap_or_else(ChecksConfig::all_enabled)
            }
        }
    }

    fn store_entry(&self, key: ChecksKey, checks: ChecksConfig) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_expired();
            if self.entries.len() >= self.capacity {
                tracing::debug!(capacity = self.capacity, "Checks cache full, not caching entry");
                return;
            }
        }
        self.entries.insert(key, CachedSnapshot::new(Arc::new(checks)));
    }

    /// Remove entries whose TTL has run out
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_fresh(ttl));
    }

    /// Drop every entry for one customer
    pub fn invalidate_customer(&self, customer_id: &str) {
        self.entries.retain(|(customer, _, _), _| customer != customer_id);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
