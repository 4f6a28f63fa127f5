//! Loan desk example
//!
//! Builds an agent from an in-memory repository holding a fraud ruleset and
//! a loan approval decision graph, then decides three applications.
//!
//! Run with `RUST_LOG=verdict_sdk=debug cargo run --example loan_desk`.

use serde_json::json;
use std::sync::Arc;
use verdict_sdk::logging::{init_tracing, DEFAULT_FILTER};
use verdict_sdk::{Agent, MemoryRepository};

const FRAUD_RULESET: &str = r#"
ruleset: fraud
version: "1.2"
rules:
  - id: sanctioned_country
    if: {field: applicant.country, op: in, value: [KP, IR, SY]}
    then: {decision: deny, weight: 1.0, reason: sanctioned country}
  - id: young_account
    if:
      all:
        - {field: applicant.account_age_days, op: lt, value: 30}
        - {field: loan.amount, op: gt, value: 20000}
    then: {decision: review, weight: 0.7, reason: large loan on a new account}
  - id: email_pattern
    if: {field: applicant.email, op: matches, value: "^[a-z]+[0-9]{4,}@"}
    then: {decision: review, weight: 0.4, reason: generated looking email}
"#;

const LOAN_GRAPH: &str = r#"
name: loan_approval
decisions:
  - id: debt_ratio
    literal: "applicant.debt / applicant.income"
  - id: risk
    dependencies: [debt_ratio]
    table:
      hit_policy: FIRST
      inputs: [debt_ratio]
      rules:
        - id: low
          input_entries: ["< 0.25"]
          then: {decision: approve, weight: 0.8, reason: low debt ratio}
        - id: medium
          input_entries: ["[0.25..0.45)"]
          then: {decision: review, weight: 0.6, reason: moderate debt ratio}
        - id: high
          input_entries: ["-"]
          then: {decision: deny, weight: 0.9, reason: high debt ratio}
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(DEFAULT_FILTER)?;

    let repository = MemoryRepository::new()
        .with_ruleset("fraud", FRAUD_RULESET)
        .with_decision_graph("loan_approval", LOAN_GRAPH);

    let agent = Agent::builder("loan_desk")
        .with_repository(Arc::new(repository))
        .load_ruleset("fraud")
        .load_decision("loan_approval", "risk")
        .with_strategy_name("weighted_average")?
        .build()
        .await?;

    let applications = [
        json!({
            "applicant": {"country": "NL", "account_age_days": 900, "email": "ada@example.com",
                          "debt": 4000, "income": 52000},
            "loan": {"amount": 15000}
        }),
        json!({
            "applicant": {"country": "US", "account_age_days": 12, "email": "user20931@example.com",
                          "debt": 18000, "income": 50000},
            "loan": {"amount": 40000}
        }),
        json!({
            "applicant": {"country": "IR", "account_age_days": 300, "email": "k@example.com",
                          "debt": 30000, "income": 40000},
            "loan": {"amount": 5000}
        }),
    ];

    println!("{}", "=".repeat(72));
    for (index, application) in applications.iter().enumerate() {
        let decision = agent.decide_json(application)?;
        println!(
            "Application #{}: {} (confidence {:.2})",
            index + 1,
            decision.decision(),
            decision.confidence()
        );
        for line in decision.explanations() {
            println!("  - {}", line);
        }
        println!("  audit hash: {}", decision.audit_hash());
        println!("{}", "-".repeat(72));
    }

    Ok(())
}
