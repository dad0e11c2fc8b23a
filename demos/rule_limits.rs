//! Rule limits example
//!
//! Prints the per-type amount limits for a few spending profiles and runs
//! the rule engine over some borderline transfers, without any models.

use fraudgate_core::{ChecksConfig, Transaction, TransferType, UserStatistics};
use fraudgate_runtime::{LimitCalculator, RuleEngine, RuleInput, RulePolicy};

fn main() -> anyhow::Result<()> {
    println!("=== Rule Limits Example ===\n");

    let policy = match std::env::args().nth(1) {
        Some(path) => {
            println!("Policy: {}\n", path);
            RulePolicy::from_file(path)?
        }
        None => {
            println!("Policy: built-in defaults\n");
            RulePolicy::default()
        }
    };

    let calculator = LimitCalculator::new(&policy);
    for (avg, std) in [(0.0, 0.0), (5000.0, 2000.0), (12000.0, 6500.0)] {
        let profile = calculator.profile(avg, std);
        println!(
            "Profile avg={:.0} std={:.0}{}",
            profile.avg,
            profile.std,
            if profile.defaulted { " (default)" } else { "" }
        );
        for row in calculator.limits_for_all(avg, std) {
            println!(
                "  {:<16} k={:<4} limit={:>10.2}",
                row.transfer_type.name(),
                row.multiplier,
                row.limit
            );
        }
        println!();
    }

    let rules = RuleEngine::new(policy);
    let checks = ChecksConfig::all_enabled();
    let mut stats = UserStatistics::default();
    stats.avg_amount = 5000.0;
    stats.std_amount = 2000.0;
    stats.current_month_spending = 100000.0;

    let transfers = [
        (
            "Under the overseas limit",
            Transaction::new(8500.0, TransferType::Overseas).with_new_beneficiary(false),
        ),
        (
            "Over the overseas limit",
            Transaction::new(9500.0, TransferType::Overseas).with_new_beneficiary(false),
        ),
        (
            "Fourth overseas in 10 minutes",
            Transaction::new(500.0, TransferType::Overseas)
                .with_velocity(1, 4, 4)
                .with_new_beneficiary(false),
        ),
        (
            "Pushes past the monthly cap",
            Transaction::new(11000.0, TransferType::InternalBank).with_new_beneficiary(false),
        ),
        (
            "New overseas payee",
            Transaction::new(5000.0, TransferType::Overseas).with_new_beneficiary(true),
        ),
    ];

    println!("Rule evaluation (avg=5000 std=2000, month so far 100000):");
    for (title, txn) in &transfers {
        let outcome = rules.evaluate(&RuleInput::from_parts(txn, &stats), &checks);
        println!(
            "  {:<30} violated={} limit={:.2}",
            title, outcome.violated, outcome.threshold
        );
        for reason in outcome.reasons() {
            println!("    - {}", reason);
        }
    }

    Ok(())
}
