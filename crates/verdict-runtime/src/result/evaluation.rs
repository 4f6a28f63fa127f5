//! A single evaluator's proposed outcome

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdict_core::ast::ThenClause;

/// One evaluator's decision proposal, prior to aggregation.
///
/// Built once and never mutated afterwards; the builder-style methods consume
/// and return the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    decision: String,
    weight: f64,
    reason: String,
    #[serde(default)]
    evaluator_name: String,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
}

impl Evaluation {
    /// The weight is clamped to `[0, 1]`; NaN becomes 0
    pub fn new(decision: impl Into<String>, weight: f64, reason: impl Into<String>) -> Self {
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        Self {
            decision: decision.into(),
            weight,
            reason: reason.into(),
            evaluator_name: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn from_then(then: &ThenClause) -> Self {
        Self::new(then.decision.clone(), then.weight, then.reason.clone())
    }

    pub fn with_evaluator_name(mut self, name: impl Into<String>) -> Self {
        self.evaluator_name = name.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn decision(&self) -> &str {
        &self.decision
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn evaluator_name(&self) -> &str {
        &self.evaluator_name
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Id of the rule that produced this evaluation, if recorded
    pub fn rule_id(&self) -> Option<&str> {
        self.metadata.get("rule_id").and_then(serde_json::Value::as_str)
    }

    /// Explainability trace, if recorded
    pub fn trace(&self) -> Option<&serde_json::Value> {
        self.metadata.get("trace")
    }
}
