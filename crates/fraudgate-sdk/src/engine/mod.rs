//! FraudEngine - Main API for screening transfers
//!
//! The module is organized into:
//! - `types`: response and health types
//! - `fraud_engine`: orchestration around the hybrid engine
//! - `tests`: unit tests (test-only)

mod fraud_engine;
mod types;

pub(crate) use fraud_engine::Collaborators;
pub use fraud_engine::FraudEngine;
pub use types::{DecisionResponse, HealthStatus, ModelHealth, ModelState, ServiceStatus};
