//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use fraudgate_sdk::{
    FraudEngine, FraudEngineBuilder, InMemoryBeneficiaries, InMemoryConfigStore,
    InMemoryStatistics, InMemoryVelocity, TransferRequest, TransferType,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const CUSTOMER: &str = "CUST-1001";
pub const ACCOUNT: &str = "011-2233445-001";
pub const OWN_ACCOUNT: &str = "011-2233445-002";
pub const UK_IBAN: &str = "GB29NWBK60161331926819";

/// Forest that isolates transfers above 20000 in one split
fn forest_artifact() -> serde_json::Value {
    let tree = json!({"nodes": [
        {"type": "split", "feature": 0, "threshold": 20000.0, "left": 1, "right": 2},
        {"type": "split", "feature": 1, "threshold": 3.5, "left": 3, "right": 4},
        {"type": "leaf", "samples": 1},
        {"type": "leaf", "samples": 180},
        {"type": "leaf", "samples": 40}
    ]});
    json!({
        "feature_names": ["transaction_amount", "transfer_type_encoded"],
        "max_samples": 256,
        "offset": -0.5,
        "trees": [tree.clone(), tree.clone(), tree]
    })
}

/// Autoencoder that reconstructs the training mean
fn autoencoder_artifact() -> serde_json::Value {
    json!({
        "feature_names": ["transaction_amount", "txn_count_10min", "recent_burst"],
        "scaler": {"mean": [4000.0, 1.0, 0.0], "scale": [3000.0, 1.0, 1.0]},
        "layers": [
            {"weights": [[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]], "bias": [0.0, 0.0], "activation": "relu"},
            {"weights": [[0.0, 0.0], [0.0, 0.0], [0.0, 0.0]], "bias": [0.0, 0.0, 0.0], "activation": "linear"}
        ],
        "threshold": 5.0
    })
}

/// Test helper holding model artifacts on disk and in-memory collaborators
pub struct TestEngine {
    dir: TempDir,
    forest: bool,
    autoencoder: bool,
    pub statistics: Arc<InMemoryStatistics>,
    pub velocity: Arc<InMemoryVelocity>,
    pub beneficiaries: Arc<InMemoryBeneficiaries>,
    pub config_store: Arc<InMemoryConfigStore>,
}

impl TestEngine {
    /// Rules only. The customer already knows both test recipients.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("forest.json"), forest_artifact().to_string())
            .expect("write forest artifact");
        std::fs::write(
            dir.path().join("autoencoder.json"),
            autoencoder_artifact().to_string(),
        )
        .expect("write autoencoder artifact");

        let beneficiaries = InMemoryBeneficiaries::new();
        beneficiaries.add_known(CUSTOMER, OWN_ACCOUNT);
        beneficiaries.add_known(CUSTOMER, UK_IBAN);

        Self {
            dir,
            forest: false,
            autoencoder: false,
            statistics: Arc::new(InMemoryStatistics::new()),
            velocity: Arc::new(InMemoryVelocity::new()),
            beneficiaries: Arc::new(beneficiaries),
            config_store: Arc::new(InMemoryConfigStore::new()),
        }
    }

    pub fn with_forest(mut self) -> Self {
        self.forest = true;
        self
    }

    pub fn with_autoencoder(mut self) -> Self {
        self.autoencoder = true;
        self
    }

    pub fn forest_path(&self) -> PathBuf {
        self.dir.path().join("forest.json")
    }

    pub fn autoencoder_path(&self) -> PathBuf {
        self.dir.path().join("autoencoder.json")
    }

    /// Build an engine wired to this helper's collaborators
    pub async fn build(&self) -> FraudEngine {
        let mut builder = FraudEngineBuilder::new()
            .with_statistics_provider(self.statistics.clone())
            .with_velocity_provider(self.velocity.clone())
            .with_beneficiary_checker(self.beneficiaries.clone())
            .with_config_store(self.config_store.clone());
        if self.forest {
            builder = builder.with_forest_model(self.forest_path());
        }
        if self.autoencoder {
            builder = builder.with_autoencoder_model(self.autoencoder_path());
        }
        builder.build().await.expect("build fraud engine")
    }
}

pub fn own_account_transfer(amount: f64) -> TransferRequest {
    TransferRequest::new(CUSTOMER, ACCOUNT, OWN_ACCOUNT, amount, TransferType::OwnAccount)
}

pub fn overseas_transfer(amount: f64) -> TransferRequest {
    TransferRequest::new(CUSTOMER, ACCOUNT, UK_IBAN, amount, TransferType::Overseas)
        .with_swift("NWBKGB2L")
        .with_bank_country("UK")
        .with_currencies("AED", "GBP")
        .with_charges_type("SHA")
}
