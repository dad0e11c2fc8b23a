//! FraudGate SDK
//!
//! High-level API for screening bank transfers: request validation,
//! collaborator lookups, cached configuration and the hybrid decision.

pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod providers;
pub mod request;

// Re-export main types
pub use builder::FraudEngineBuilder;
pub use cache::{ChecksCache, RiskConfigCache};
pub use config::EngineConfig;
pub use engine::{DecisionResponse, FraudEngine, HealthStatus, ModelHealth, ModelState, ServiceStatus};
pub use error::{Result, SdkError};
pub use providers::{
    BeneficiaryChecker, ConfigStore, InMemoryBeneficiaries, InMemoryConfigStore, InMemoryStatistics,
    InMemoryVelocity, StatisticsProvider, VelocityProvider,
};
pub use request::TransferRequest;

// Re-export commonly used types from dependencies
pub use fraudgate_core::{
    Advice, CheckKind, CheckSetting, DecisionResult, IndividualScores, RiskConfig, RiskLevel,
    ThresholdEntry, TransferType, UserStatistics, VelocitySnapshot,
};
pub use fraudgate_runtime::{MetricsCollector, RulePolicy, TypeLimit};
