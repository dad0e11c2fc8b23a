//! Observability module
//!
//! In-process counters and histograms for decisions and detector health.

pub mod metrics;

pub use metrics::{Counter, Histogram, Metrics, MetricsCollector};
