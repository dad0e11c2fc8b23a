//! Transfer screening example
//!
//! This example demonstrates:
//! - Loading the engine configuration from config/fraudgate.yaml
//! - Seeding in-memory statistics, velocity and beneficiary collaborators
//! - Screening a handful of transfers and printing the decisions
//!
//! Run from the repository root:
//!   cargo run --example score_transfer

use fraudgate_sdk::{
    EngineConfig, FraudEngineBuilder, InMemoryBeneficiaries, InMemoryStatistics, InMemoryVelocity,
    TransferRequest, TransferType, UserStatistics,
};
use fraudgate_runtime::Metrics;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CUSTOMER: &str = "1000016";
const ACCOUNT: &str = "011000016001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fraudgate_sdk=info,fraudgate_runtime=info")),
        )
        .init();

    println!("=== Transfer Screening Example ===\n");

    let statistics = Arc::new(InMemoryStatistics::new());
    let mut profile = UserStatistics::default();
    profile.avg_amount = 3200.0;
    profile.std_amount = 1400.0;
    profile.max_amount = 9500.0;
    profile.current_month_spending = 21000.0;
    statistics.insert(CUSTOMER, ACCOUNT, profile);

    let velocity = Arc::new(InMemoryVelocity::new());

    let beneficiaries = Arc::new(InMemoryBeneficiaries::new());
    beneficiaries.add_known(CUSTOMER, "011000016002");
    beneficiaries.add_known(CUSTOMER, "GB29NWBK60161331926819");

    let config = EngineConfig::load()?;
    let engine = FraudEngineBuilder::from_config(config)
        .with_statistics_provider(statistics)
        .with_velocity_provider(velocity.clone())
        .with_beneficiary_checker(beneficiaries)
        .build()
        .await?;

    let health = engine.health();
    println!("Engine status: {:?}", health.status);
    println!("  Isolation forest: {:?}", health.models.isolation_forest);
    println!("  Autoencoder: {:?}\n", health.models.autoencoder);

    let scenarios = vec![
        (
            "Routine own-account transfer",
            TransferRequest::new(CUSTOMER, ACCOUNT, "011000016002", 1500.0, TransferType::OwnAccount),
        ),
        (
            "Large overseas transfer to a known payee",
            TransferRequest::new(
                CUSTOMER,
                ACCOUNT,
                "GB29NWBK60161331926819",
                18000.0,
                TransferType::Overseas,
            )
            .with_swift("NWBKGB2L")
            .with_bank_country("UK")
            .with_currencies("AED", "GBP")
            .with_charges_type("SHA"),
        ),
        (
            "Overseas transfer to a new payee",
            TransferRequest::new(
                CUSTOMER,
                ACCOUNT,
                "DE89370400440532013000",
                2500.0,
                TransferType::Overseas,
            )
            .with_swift("COBADEFFXXX")
            .with_bank_country("Germany")
            .with_currencies("AED", "EUR"),
        ),
    ];

    for (title, request) in &scenarios {
        let response = engine.decide(request).await?;
        velocity.record_transfer(CUSTOMER, ACCOUNT);

        println!("--- {} ---", title);
        println!("  Transaction ID: {}", response.transaction_id);
        println!("  Fraud: {}", response.result.is_fraud);
        println!("  Risk: {} ({:.3})", response.result.risk_level, response.result.risk_score);
        println!("  Advice: {:?}", response.result.advice);
        println!("  Limit: {:.2}", response.result.threshold);
        if !response.result.reasons.is_empty() {
            println!("  Reasons:");
            for reason in &response.result.reasons {
                println!("    - {}", reason);
            }
        }
        println!("  Processing Time: {}ms\n", response.processing_time_ms);
    }

    // Full payload for the last decision
    if let Some((_, request)) = scenarios.last() {
        let response = engine.decide(request).await?;
        println!("Response JSON:");
        println!("{}\n", response.to_json()?);
    }

    if let Some(metrics) = engine.metrics() {
        println!("Metrics:");
        let mut counters: Vec<_> = metrics.snapshot().into_iter().collect();
        counters.sort();
        for (name, value) in counters {
            println!("  {}: {}", name, value);
        }
        let latency = metrics.histogram("decision_latency_ms");
        println!(
            "  decision latency: mean {:.3}ms p95 {:.3}ms max {:.3}ms",
            latency.mean(),
            latency.percentile(95.0),
            latency.max()
        );
    }

    Ok(())
}
