//! Builder pattern for Agent

use crate::agent::Agent;
use crate::audit::{AuditHasher, AuditSink, NoopAuditSink, TracingAuditSink};
use crate::config::{AgentConfig, AuditSinkKind, GraphDecisionRef};
use crate::error::{Result, SdkError};
use crate::scoring::{strategy_from_name, ScoringStrategy, WeightedAverage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use verdict_core::ast::Ruleset;
use verdict_core::ConfigurationError;
use verdict_parser::RulesetParser;
use verdict_repository::Repository;
use verdict_runtime::{DecisionGraph, DecisionGraphEvaluator, Evaluator, RuleEngine};

/// Builder for Agent
///
/// Evaluators can be added directly or named by id and loaded from a
/// repository when [`build`](Self::build) runs.
///
/// ```rust,ignore
/// use verdict_sdk::{Agent, MemoryRepository};
///
/// let agent = Agent::builder("loan_desk")
///     .with_repository(Arc::new(repository))
///     .load_ruleset("fraud")
///     .load_decision("loan_approval", "risk")
///     .with_strategy_name("majority_vote")?
///     .build()
///     .await?;
/// ```
pub struct AgentBuilder {
    name: String,
    evaluators: Vec<Arc<dyn Evaluator>>,
    strategy: Option<Arc<dyn ScoringStrategy>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    hasher: Option<Arc<AuditHasher>>,
    repository: Option<Arc<dyn Repository>>,
    ruleset_ids: Vec<String>,
    graph_decisions: Vec<GraphDecisionRef>,
}

impl AgentBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evaluators: Vec::new(),
            strategy: None,
            audit_sink: None,
            hasher: None,
            repository: None,
            ruleset_ids: Vec::new(),
            graph_decisions: Vec::new(),
        }
    }

    /// Start from a configuration; the repository it names is opened here
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Self::new(config.name.clone()).with_strategy_name(&config.strategy)?;

        builder.audit_sink = Some(match config.audit_sink {
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
            AuditSinkKind::Noop => Arc::new(NoopAuditSink),
        });
        if let Some(capacity) = config.audit_cache_capacity {
            builder = builder.with_audit_cache_capacity(capacity);
        }
        if let Some(repository) = &config.repository {
            builder.repository = Some(repository.build()?);
        }
        builder.ruleset_ids = config.rulesets.clone();
        builder.graph_decisions = config.decisions.clone();
        Ok(builder)
    }

    // ========== Evaluators ==========

    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluators.push(Arc::new(evaluator));
        self
    }

    pub fn with_shared_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    /// Add a rule engine over `ruleset`
    pub fn with_ruleset(self, ruleset: Ruleset) -> Self {
        self.with_evaluator(RuleEngine::new(ruleset))
    }

    /// Parse a ruleset document (JSON or YAML) and add a rule engine over it
    pub fn with_ruleset_source(self, text: &str) -> Result<Self> {
        let ruleset = RulesetParser::parse(text)?;
        Ok(self.with_ruleset(ruleset))
    }

    /// Add one decision of a graph as an evaluator
    pub fn with_graph_decision(
        self,
        graph: Arc<DecisionGraph>,
        decision_id: impl Into<String>,
    ) -> Result<Self> {
        let decision_id = decision_id.into();
        if graph.node(&decision_id).is_none() {
            return Err(ConfigurationError::UnknownDecision(decision_id).into());
        }
        Ok(self.with_evaluator(DecisionGraphEvaluator::new(graph, decision_id)))
    }

    // ========== Repository ==========

    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Ruleset loaded from the repository at build time
    pub fn load_ruleset(mut self, id: impl Into<String>) -> Self {
        self.ruleset_ids.push(id.into());
        self
    }

    /// Graph decision loaded from the repository at build time
    pub fn load_decision(mut self, graph: impl Into<String>, decision: impl Into<String>) -> Self {
        self.graph_decisions.push(GraphDecisionRef {
            graph: graph.into(),
            decision: decision.into(),
            name: None,
        });
        self
    }

    // ========== Aggregation and audit ==========

    pub fn with_strategy(mut self, strategy: impl ScoringStrategy + 'static) -> Self {
        self.strategy = Some(Arc::new(strategy));
        self
    }

    pub fn with_strategy_name(mut self, name: &str) -> Result<Self> {
        self.strategy = Some(strategy_from_name(name)?);
        Ok(self)
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Use a private hash cache of this size instead of the shared one
    pub fn with_audit_cache_capacity(mut self, capacity: usize) -> Self {
        self.hasher = Some(Arc::new(AuditHasher::new(capacity)));
        self
    }

    /// Load the named definitions and build the agent
    pub async fn build(self) -> Result<Agent> {
        let mut evaluators = self.evaluators;

        let wants_repository = !self.ruleset_ids.is_empty() || !self.graph_decisions.is_empty();
        if wants_repository {
            let repository = self.repository.as_ref().ok_or_else(|| {
                SdkError::ConfigError(format!(
                    "agent '{}' names stored definitions but has no repository",
                    self.name
                ))
            })?;

            for id in &self.ruleset_ids {
                let (ruleset, _) = repository.load_ruleset(id).await?;
                debug!("Agent '{}' loaded ruleset '{}'", self.name, id);
                evaluators.push(Arc::new(RuleEngine::new(ruleset)));
            }

            let mut graphs: HashMap<&str, Arc<DecisionGraph>> = HashMap::new();
            for reference in &self.graph_decisions {
                let graph = match graphs.get(reference.graph.as_str()) {
                    Some(graph) => Arc::clone(graph),
                    None => {
                        let (definition, _) =
                            repository.load_decision_graph(&reference.graph).await?;
                        let graph = DecisionGraph::new(definition)?;
                        graph.topological_order()?;
                        let graph = Arc::new(graph);
                        graphs.insert(reference.graph.as_str(), Arc::clone(&graph));
                        graph
                    }
                };
                if graph.node(&reference.decision).is_none() {
                    return Err(ConfigurationError::UnknownDecision(reference.decision.clone()).into());
                }
                let mut evaluator = DecisionGraphEvaluator::new(graph, reference.decision.clone());
                if let Some(name) = &reference.name {
                    evaluator = evaluator.with_name(name.clone());
                }
                evaluators.push(Arc::new(evaluator));
            }
        }

        if evaluators.is_empty() {
            return Err(SdkError::ConfigError(format!(
                "agent '{}' has no evaluators",
                self.name
            )));
        }

        let strategy = self
            .strategy
            .unwrap_or_else(|| Arc::new(WeightedAverage) as Arc<dyn ScoringStrategy>);
        let audit_sink = self
            .audit_sink
            .unwrap_or_else(|| Arc::new(TracingAuditSink) as Arc<dyn AuditSink>);
        let hasher = self.hasher.unwrap_or_else(AuditHasher::global);

        debug!(
            "Built agent '{}' with {} evaluators, strategy {}",
            self.name,
            evaluators.len(),
            strategy.name()
        );
        Ok(Agent::new(self.name, evaluators, strategy, audit_sink, hasher))
    }
}
