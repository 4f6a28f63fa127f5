//! Agent: runs every evaluator and aggregates the results

use crate::audit::{AuditHasher, AuditSink};
use crate::builder::AgentBuilder;
use crate::decision::Decision;
use crate::error::{Result, SdkError};
use crate::scoring::ScoringStrategy;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use verdict_runtime::{Context, Evaluation, Evaluator};

/// Combines the evaluations of several evaluators into one auditable
/// [`Decision`].
///
/// An evaluator that returns an error or no evaluation abstains and is left
/// out of aggregation; the call fails only when every evaluator abstains.
/// Agents are immutable after construction and can be shared between
/// threads.
pub struct Agent {
    name: String,
    evaluators: Vec<Arc<dyn Evaluator>>,
    strategy: Arc<dyn ScoringStrategy>,
    audit_sink: Arc<dyn AuditSink>,
    hasher: Arc<AuditHasher>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("evaluators", &self.evaluator_names())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

impl Agent {
    pub(crate) fn new(
        name: String,
        evaluators: Vec<Arc<dyn Evaluator>>,
        strategy: Arc<dyn ScoringStrategy>,
        audit_sink: Arc<dyn AuditSink>,
        hasher: Arc<AuditHasher>,
    ) -> Self {
        Self {
            name,
            evaluators,
            strategy,
            audit_sink,
            hasher,
        }
    }

    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluator_names(&self) -> Vec<&str> {
        self.evaluators.iter().map(|e| e.name()).collect()
    }

    pub fn strategy(&self) -> &dyn ScoringStrategy {
        self.strategy.as_ref()
    }

    /// Evaluate `context` with every evaluator and aggregate the results
    pub fn decide(&self, context: &Context) -> Result<Decision> {
        let evaluations = self.collect_evaluations(context);
        if evaluations.is_empty() {
            return Err(SdkError::NoEvaluations {
                evaluators: self.evaluators.len(),
            });
        }

        let score = self
            .strategy
            .score(&evaluations)
            .ok_or(SdkError::NoEvaluations {
                evaluators: self.evaluators.len(),
            })?;

        let payload = json!({
            "context": context.to_json(),
            "evaluations": evaluations,
            "decision": score.decision,
            "confidence": score.confidence,
            "strategy": self.strategy.name(),
        });
        let hash = self.hasher.hash(&payload)?;

        let decision = Decision::new(
            score.decision,
            score.confidence,
            evaluations,
            self.strategy.name().to_string(),
            payload,
            hash,
        );
        self.audit_sink.record(&decision, context);

        info!(
            "Agent '{}' decided {} (confidence {:.3}) from {} of {} evaluators",
            self.name,
            decision.decision(),
            decision.confidence(),
            decision.evaluations().len(),
            self.evaluators.len()
        );
        Ok(decision)
    }

    /// [`decide`](Self::decide) over a JSON object
    pub fn decide_json(&self, input: &serde_json::Value) -> Result<Decision> {
        let context = Context::from_json(input)?;
        self.decide(&context)
    }

    fn collect_evaluations(&self, context: &Context) -> Vec<Evaluation> {
        let mut evaluations = Vec::with_capacity(self.evaluators.len());
        for evaluator in &self.evaluators {
            match evaluator.evaluate(context) {
                Ok(Some(mut evaluation)) => {
                    if evaluation.evaluator_name().is_empty() {
                        evaluation = evaluation.with_evaluator_name(evaluator.name());
                    }
                    debug!(
                        "Evaluator '{}' returned {} ({})",
                        evaluator.name(),
                        evaluation.decision(),
                        evaluation.weight()
                    );
                    evaluations.push(evaluation);
                }
                Ok(None) => debug!("Evaluator '{}' abstained", evaluator.name()),
                Err(e) => warn!(
                    "Evaluator '{}' failed and abstains: {}",
                    evaluator.name(),
                    e
                ),
            }
        }
        evaluations
    }
}
