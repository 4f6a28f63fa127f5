//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use verdict_runtime::RuntimeError;
use verdict_sdk::{AuditSink, Context, Decision, Evaluation, Evaluator, MemoryRepository};

pub const FRAUD_RULESET: &str = r#"{
    "version": "2.1",
    "ruleset": "fraud",
    "rules": [
        {"id": "blocked_country",
         "if": {"field": "txn.country", "op": "in", "value": ["KP", "IR"]},
         "then": {"decision": "deny", "weight": 1.0, "reason": "sanctioned"}},
        {"id": "large_new_account",
         "if": {"all": [
            {"field": "txn.amount", "op": "gt", "value": 5000},
            {"field": "account.age_days", "op": "lt", "value": 30}
         ]},
         "then": {"decision": "review", "weight": 0.7, "reason": "large amount on new account"}},
        {"id": "default",
         "if": {"all": []},
         "then": {"decision": "approve", "weight": 0.4}}
    ]
}"#;

pub const LIMITS_RULESET: &str = r#"
ruleset: limits
rules:
  - id: over_limit
    if: {field: txn.amount, op: gt, value: 10000}
    then: {decision: deny, weight: 0.9, reason: over single transaction limit}
  - id: near_limit
    if: {field: txn.amount, op: between, value: [5000, 10000]}
    then: {decision: review, weight: 0.6, reason: near limit}
"#;

pub const LOAN_GRAPH: &str = r#"
name: loan_approval
decisions:
  - id: debt_ratio
    literal: "debt / income"
  - id: risk
    dependencies: [debt_ratio]
    table:
      hit_policy: UNIQUE
      inputs: [debt_ratio]
      rules:
        - id: low
          input_entries: ["< 0.3"]
          then: {decision: approve, weight: 0.8, reason: low debt ratio}
        - id: high
          input_entries: [">= 0.3"]
          then: {decision: review, weight: 0.8, reason: high debt ratio}
"#;

/// Repository preloaded with the fixtures above
pub fn fixture_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_ruleset("fraud", FRAUD_RULESET)
        .with_ruleset("limits", LIMITS_RULESET)
        .with_decision_graph("loan_approval", LOAN_GRAPH)
}

pub fn ctx(input: serde_json::Value) -> Context {
    Context::from_json(&input).unwrap()
}

/// Always returns the same evaluation
pub struct FixedEvaluator {
    pub name: String,
    pub evaluation: Evaluation,
}

impl FixedEvaluator {
    pub fn new(name: &str, decision: &str, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            evaluation: Evaluation::new(decision, weight, format!("{} says {}", name, decision)),
        }
    }
}

impl Evaluator for FixedEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _context: &Context) -> verdict_runtime::Result<Option<Evaluation>> {
        Ok(Some(self.evaluation.clone()))
    }
}

/// Fails on every call
pub struct FailingEvaluator;

impl Evaluator for FailingEvaluator {
    fn name(&self) -> &str {
        "failing"
    }

    fn evaluate(&self, _context: &Context) -> verdict_runtime::Result<Option<Evaluation>> {
        Err(RuntimeError::InvalidContext("upstream unavailable".to_string()))
    }
}

/// Never has an opinion
pub struct SilentEvaluator;

impl Evaluator for SilentEvaluator {
    fn name(&self) -> &str {
        "silent"
    }

    fn evaluate(&self, _context: &Context) -> verdict_runtime::Result<Option<Evaluation>> {
        Ok(None)
    }
}

/// Audit sink that keeps what it is given
#[derive(Default)]
pub struct RecordingSink {
    pub records: Mutex<Vec<(String, String)>>,
    pub calls: AtomicUsize,
}

impl RecordingSink {
    pub fn shared() -> Arc<RecordingSink> {
        Arc::new(RecordingSink::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn hashes(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, hash)| hash.clone())
            .collect()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, decision: &Decision, _context: &Context) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().push((
            decision.decision().to_string(),
            decision.audit_hash().to_string(),
        ));
    }
}
