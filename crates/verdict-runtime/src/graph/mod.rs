//! Decision graph and hit-policy engine
//!
//! A [`DecisionGraph`] is an immutable set of named decisions connected by
//! dependency edges. Evaluating a decision first resolves its dependencies in
//! topological order, binding each dependency's value into the scope of the
//! decisions that use it. Values are memoized per call, never on the shared
//! graph, so one graph can serve concurrent requests.

mod hit_policy;
mod table;

use crate::condition::ConditionEvaluator;
use crate::context::Context;
use crate::error::{Result, RuntimeError};
use crate::evaluator::Evaluator;
use crate::feel::FeelEvaluator;
use crate::result::Evaluation;
use indexmap::IndexMap;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use verdict_core::ast::{DecisionFunction, DecisionGraphDefinition, DecisionLogic, DecisionNode};
use verdict_core::{ConfigurationError, FeelValue};

/// Result of evaluating one decision
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub decision_id: String,
    /// Value of the requested decision
    pub value: FeelValue,
    /// Decision-table evaluation of the requested decision, when it is a table
    pub evaluation: Option<Evaluation>,
    /// Every decision evaluated during the call, in evaluation order
    pub values: IndexMap<String, FeelValue>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Validated, immutable decision graph
#[derive(Debug, Clone)]
pub struct DecisionGraph {
    name: String,
    nodes: Vec<DecisionNode>,
    index: HashMap<String, usize>,
    conditions: ConditionEvaluator,
}

impl DecisionGraph {
    /// Build a graph, rejecting duplicate ids and dependencies on unknown decisions.
    ///
    /// Cycles are reported by [`topological_order`](Self::topological_order)
    /// and by evaluation.
    pub fn new(definition: DecisionGraphDefinition) -> std::result::Result<Self, ConfigurationError> {
        let mut index = HashMap::with_capacity(definition.decisions.len());
        for (position, node) in definition.decisions.iter().enumerate() {
            if index.insert(node.id.clone(), position).is_some() {
                return Err(ConfigurationError::DuplicateId {
                    kind: "decision".to_string(),
                    id: node.id.clone(),
                });
            }
        }
        for node in &definition.decisions {
            if let Some(missing) = node
                .dependencies
                .iter()
                .find(|dependency| !index.contains_key(&dependency.decision_id))
            {
                return Err(ConfigurationError::UnknownDependency {
                    decision: node.id.clone(),
                    dependency: missing.decision_id.clone(),
                });
            }
        }

        Ok(Self {
            name: definition.name,
            nodes: definition.decisions,
            index,
            conditions: ConditionEvaluator::new(),
        })
    }

    /// Use a specific condition evaluator for table rows with condition guards
    pub fn with_condition_evaluator(mut self, conditions: ConditionEvaluator) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self, decision_id: &str) -> Option<&DecisionNode> {
        self.index.get(decision_id).map(|&i| &self.nodes[i])
    }

    pub fn decision_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    /// Every decision, dependencies before dependents
    pub fn topological_order(&self) -> std::result::Result<Vec<&str>, ConfigurationError> {
        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for start in 0..self.nodes.len() {
            self.visit(start, &mut marks, &mut Vec::new(), &mut order)?;
        }
        Ok(order.into_iter().map(|i| self.nodes[i].id.as_str()).collect())
    }

    /// Evaluate `decision_id` and everything it depends on
    pub fn evaluate(&self, decision_id: &str, context: &Context) -> Result<DecisionOutcome> {
        let target = *self
            .index
            .get(decision_id)
            .ok_or_else(|| ConfigurationError::UnknownDecision(decision_id.to_string()))?;

        let mut marks = vec![Mark::White; self.nodes.len()];
        let mut order = Vec::new();
        self.visit(target, &mut marks, &mut Vec::new(), &mut order)?;

        let mut values: IndexMap<String, FeelValue> = IndexMap::with_capacity(order.len());
        let mut evaluation = None;
        for &position in &order {
            let node = &self.nodes[position];
            let scope = context.with_bindings(node.dependencies.iter().map(|dependency| {
                let value = values.get(&dependency.decision_id).cloned().unwrap_or_default();
                (dependency.bound_name.clone(), value)
            }));
            let (value, node_evaluation) = self.evaluate_node(node, &scope)?;
            debug!(graph = %self.name, decision = %node.id, value = %value, "Decision evaluated");
            if position == target {
                evaluation = node_evaluation;
            }
            values.insert(node.id.clone(), value);
        }

        Ok(DecisionOutcome {
            decision_id: decision_id.to_string(),
            value: values.get(decision_id).cloned().unwrap_or_default(),
            evaluation,
            values,
        })
    }

    /// White/gray/black depth-first search appending to `order` in post-order
    fn visit(
        &self,
        position: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> std::result::Result<(), ConfigurationError> {
        match marks[position] {
            Mark::Black => return Ok(()),
            Mark::Gray => {
                let start = path.iter().position(|&p| p == position).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[start..].iter().map(|&p| self.nodes[p].id.clone()).collect();
                cycle.push(self.nodes[position].id.clone());
                return Err(ConfigurationError::CircularDependency {
                    decision: self.nodes[position].id.clone(),
                    path: cycle,
                });
            }
            Mark::White => {}
        }

        marks[position] = Mark::Gray;
        path.push(position);
        for dependency in &self.nodes[position].dependencies {
            let next = *self.index.get(&dependency.decision_id).ok_or_else(|| {
                ConfigurationError::UnknownDependency {
                    decision: self.nodes[position].id.clone(),
                    dependency: dependency.decision_id.clone(),
                }
            })?;
            self.visit(next, marks, path, order)?;
        }
        path.pop();
        marks[position] = Mark::Black;
        order.push(position);
        Ok(())
    }

    fn evaluate_node(&self, node: &DecisionNode, scope: &Context) -> Result<(FeelValue, Option<Evaluation>)> {
        match &node.logic {
            DecisionLogic::Literal(expression) => {
                Ok((FeelEvaluator::evaluate(&expression.expr, scope)?, None))
            }
            DecisionLogic::Table(decision_table) => {
                let (matches, trace) =
                    table::matching_rows(&node.id, decision_table, scope, &self.conditions)?;
                let evaluation = hit_policy::apply(decision_table.hit_policy, &node.id, &matches)?
                    .map(|evaluation| {
                        evaluation
                            .with_metadata("decision_id", json!(node.id))
                            .with_metadata("hit_policy", json!(decision_table.hit_policy.name()))
                            .with_metadata("trace", serde_json::to_value(&trace).unwrap_or_default())
                    });
                let value = evaluation
                    .as_ref()
                    .map_or(FeelValue::Null, |e| FeelValue::string(e.decision()));
                Ok((value, evaluation))
            }
            DecisionLogic::Function(DecisionFunction::Feel { params, body, .. }) => {
                let arguments = Context::from_pairs(
                    params
                        .iter()
                        .map(|param| (param.as_str(), scope.get(param).cloned().unwrap_or_default())),
                );
                Ok((FeelEvaluator::evaluate(body, &arguments)?, None))
            }
            DecisionLogic::Function(DecisionFunction::Native { name, func }) => {
                let value = (func.as_ref())(scope.values()).map_err(|message| RuntimeError::Function {
                    function: name.clone(),
                    message,
                })?;
                Ok((value, None))
            }
        }
    }
}

/// Adapts one decision of a graph to the [`Evaluator`] interface.
///
/// A table decision yields its hit-policy evaluation. A string, boolean or
/// number value yields an evaluation with weight 1. A null value abstains.
#[derive(Debug, Clone)]
pub struct DecisionGraphEvaluator {
    graph: Arc<DecisionGraph>,
    decision_id: String,
    name: String,
}

impl DecisionGraphEvaluator {
    pub fn new(graph: Arc<DecisionGraph>, decision_id: impl Into<String>) -> Self {
        let decision_id = decision_id.into();
        Self {
            name: format!("{}::{}", graph.name(), decision_id),
            graph,
            decision_id,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Evaluator for DecisionGraphEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, context: &Context) -> Result<Option<Evaluation>> {
        let outcome = self.graph.evaluate(&self.decision_id, context)?;
        let evaluation = match outcome.evaluation {
            Some(evaluation) => Some(evaluation),
            None => {
                let decision = match &outcome.value {
                    FeelValue::String(s) => Some(s.clone()),
                    value @ (FeelValue::Boolean(_) | FeelValue::Number(_)) => Some(value.to_string()),
                    _ => None,
                };
                decision.map(|decision| {
                    let reason = format!("decision '{}' evaluated to {}", self.decision_id, outcome.value);
                    Evaluation::new(decision, 1.0, reason)
                })
            }
        };
        Ok(evaluation.map(|evaluation| {
            evaluation
                .with_evaluator_name(&self.name)
                .with_metadata("decision_id", json!(self.decision_id))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_core::ast::{Dependency, Expr, FeelExpression};

    fn literal(id: &str, expr: Expr) -> DecisionNode {
        DecisionNode::new(
            id,
            DecisionLogic::Literal(FeelExpression {
                source: id.to_string(),
                expr,
            }),
        )
    }

    fn definition(decisions: Vec<DecisionNode>) -> DecisionGraphDefinition {
        DecisionGraphDefinition {
            name: "g".to_string(),
            decisions,
        }
    }

    #[test]
    fn test_rejects_duplicates_and_unknown_dependencies() {
        let dup = definition(vec![
            literal("a", Expr::number(1)),
            literal("a", Expr::number(2)),
        ]);
        assert!(matches!(
            DecisionGraph::new(dup),
            Err(ConfigurationError::DuplicateId { .. })
        ));

        let dangling = definition(vec![literal("a", Expr::field("b")).depends_on(Dependency::on("b"))]);
        assert_eq!(
            DecisionGraph::new(dangling).unwrap_err(),
            ConfigurationError::UnknownDependency {
                decision: "a".to_string(),
                dependency: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_topological_order() {
        let graph = DecisionGraph::new(definition(vec![
            literal("c", Expr::field("b")).depends_on(Dependency::on("b")),
            literal("b", Expr::field("a")).depends_on(Dependency::on("a")),
            literal("a", Expr::number(1)),
        ]))
        .unwrap();
        assert_eq!(graph.topological_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_names_offender() {
        let graph = DecisionGraph::new(definition(vec![
            literal("a", Expr::field("b")).depends_on(Dependency::on("b")),
            literal("b", Expr::field("a")).depends_on(Dependency::on("a")),
        ]))
        .unwrap();
        let err = graph.topological_order().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::CircularDependency {
                decision: "a".to_string(),
                path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            }
        );
        assert!(matches!(
            graph.evaluate("b", &Context::empty()),
            Err(RuntimeError::Configuration(ConfigurationError::CircularDependency { .. }))
        ));
    }

    #[test]
    fn test_dependencies_bound_under_declared_names() {
        let graph = DecisionGraph::new(definition(vec![
            literal("base", Expr::field("amount")),
            literal(
                "doubled",
                Expr::arithmetic(
                    Expr::field("x"),
                    verdict_core::ast::ArithmeticOp::Mul,
                    Expr::number(2),
                ),
            )
            .depends_on(Dependency::bound_as("base", "x")),
        ]))
        .unwrap();
        let ctx = Context::from_pairs([("amount", FeelValue::from(21_i64))]);
        let outcome = graph.evaluate("doubled", &ctx).unwrap();
        assert_eq!(outcome.value, FeelValue::from(42_i64));
        assert_eq!(outcome.values.keys().collect::<Vec<_>>(), vec!["base", "doubled"]);
    }

    #[test]
    fn test_native_function_failure_surfaces() {
        let node = DecisionNode::new(
            "boom",
            DecisionLogic::Function(DecisionFunction::native("explode", |_| Err("no".to_string()))),
        );
        let graph = DecisionGraph::new(definition(vec![node])).unwrap();
        assert!(matches!(
            graph.evaluate("boom", &Context::empty()),
            Err(RuntimeError::Function { .. })
        ));
        assert!(matches!(
            graph.evaluate("missing", &Context::empty()),
            Err(RuntimeError::Configuration(ConfigurationError::UnknownDecision(_)))
        ));
    }
}
