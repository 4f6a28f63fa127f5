//! Final aggregated decision

use serde::Serialize;
use verdict_runtime::Evaluation;

/// Outcome of one [`Agent::decide`](crate::Agent::decide) call
///
/// Built once by the agent and never modified. `audit_payload` holds exactly
/// the content covered by `audit_hash`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    decision: String,
    confidence: f64,
    explanations: Vec<String>,
    evaluations: Vec<Evaluation>,
    strategy: String,
    audit_payload: serde_json::Value,
    audit_hash: String,
}

impl Decision {
    pub(crate) fn new(
        decision: String,
        confidence: f64,
        evaluations: Vec<Evaluation>,
        strategy: String,
        audit_payload: serde_json::Value,
        audit_hash: String,
    ) -> Self {
        let explanations = explain(&decision, &evaluations);
        Self {
            decision,
            confidence,
            explanations,
            evaluations,
            strategy,
            audit_payload,
            audit_hash,
        }
    }

    pub fn decision(&self) -> &str {
        &self.decision
    }

    /// In `[0, 1]`
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// One line per evaluation that supports the final decision
    pub fn explanations(&self) -> &[String] {
        &self.explanations
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    /// Name of the scoring strategy that produced this decision
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// `{context, evaluations, decision, confidence, strategy}`
    pub fn audit_payload(&self) -> &serde_json::Value {
        &self.audit_payload
    }

    /// Lowercase hex SHA-256 of the canonical audit payload
    pub fn audit_hash(&self) -> &str {
        &self.audit_hash
    }
}

fn explain(decision: &str, evaluations: &[Evaluation]) -> Vec<String> {
    evaluations
        .iter()
        .filter(|evaluation| evaluation.decision() == decision)
        .map(|evaluation| {
            let because = if evaluation.reason().is_empty() {
                evaluation.decision()
            } else {
                evaluation.reason()
            };
            format!(
                "{} ({:.2}): {}",
                evaluation.evaluator_name(),
                evaluation.weight(),
                because
            )
        })
        .collect()
}
