//! Decision metrics

use fraudgate_core::RiskLevel;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Observations a histogram keeps before dropping the oldest
pub const HISTOGRAM_WINDOW: usize = 4096;

/// Monotonic counter
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicU64,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Sliding window over the most recent observations.
///
/// `total` keeps counting after old samples fall out of the window, so rates
/// stay correct while the summaries reflect recent traffic only.
#[derive(Debug)]
pub struct Histogram {
    name: String,
    capacity: usize,
    window: RwLock<VecDeque<f64>>,
    total: AtomicU64,
}

impl Histogram {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, HISTOGRAM_WINDOW)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            window: RwLock::new(VecDeque::with_capacity(capacity.min(HISTOGRAM_WINDOW))),
            total: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observe(&self, value: f64) {
        let mut window = self.window.write().unwrap();
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(value);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Observe a duration in milliseconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64() * 1000.0);
    }

    /// Observations ever recorded, including those outside the window
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Observations currently in the window
    pub fn count(&self) -> usize {
        self.window.read().unwrap().len()
    }

    pub fn mean(&self) -> f64 {
        let window = self.window.read().unwrap();
        match window.len() {
            0 => 0.0,
            n => window.iter().sum::<f64>() / n as f64,
        }
    }

    pub fn max(&self) -> f64 {
        self.window
            .read()
            .unwrap()
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Nearest-rank percentile (0-100) over the window
    pub fn percentile(&self, p: f64) -> f64 {
        let mut sorted: Vec<f64> = self.window.read().unwrap().iter().copied().collect();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(f64::total_cmp);
        let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
        sorted[rank.round() as usize]
    }

    pub fn reset(&self) {
        self.window.write().unwrap().clear();
        self.total.store(0, Ordering::Relaxed);
    }
}

/// Metrics sink used by the engine
pub trait Metrics: Send + Sync {
    fn counter(&self, name: &str) -> Arc<Counter>;

    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Count one decision under its risk level and record its latency
    fn record_decision(&self, level: RiskLevel, is_fraud: bool, latency: Duration);

    /// Count a detector that failed and was dropped from a decision
    fn record_detector_failure(&self, detector: &str);

    fn record_error(&self, error_type: &str);
}

/// In-process metrics registry
#[derive(Debug, Default)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.counters.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn histogram_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.histograms.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Current value of every counter
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .read()
            .unwrap()
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect()
    }

    pub fn reset_all(&self) {
        for counter in self.counters.read().unwrap().values() {
            counter.reset();
        }
        for histogram in self.histograms.read().unwrap().values() {
            histogram.reset();
        }
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        if let Some(counter) = self.counters.read().unwrap().get(name) {
            return counter.clone();
        }
        self.counters
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Counter::new(name)))
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        if let Some(histogram) = self.histograms.read().unwrap().get(name) {
            return histogram.clone();
        }
        self.histograms
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::new(name)))
            .clone()
    }

    fn record_decision(&self, level: RiskLevel, is_fraud: bool, latency: Duration) {
        self.counter("decisions_total").inc();
        self.counter(&format!("decisions_{}", level.as_str().to_ascii_lowercase()))
            .inc();
        if is_fraud {
            self.counter("decisions_flagged").inc();
        }
        self.histogram("decision_latency_ms").observe_duration(latency);
    }

    fn record_detector_failure(&self, detector: &str) {
        self.counter(&format!("detector_failures_{}", detector)).inc();
    }

    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}
