//! Decision graph definitions
//!
//! A decision node computes one named value from the input context and the
//! values of the decisions it depends on. Node logic is a FEEL literal
//! expression, a decision table, or a function.

use super::expression::Expr;
use super::rule::{Condition, ThenClause};
use crate::types::{FeelContext, FeelValue};
use std::fmt;
use std::sync::Arc;

/// Decision table hit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitPolicy {
    /// Exactly one rule must match
    Unique,
    /// First matching rule in declared order
    #[default]
    First,
    /// First matching rule; rules are declared in priority order
    Priority,
    /// All matching rules must agree on the decision
    Any,
    /// First match, with every matching rule listed in metadata
    Collect,
}

impl HitPolicy {
    /// Parse a long-form policy name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "UNIQUE" => Some(HitPolicy::Unique),
            "FIRST" => Some(HitPolicy::First),
            "PRIORITY" => Some(HitPolicy::Priority),
            "ANY" => Some(HitPolicy::Any),
            "COLLECT" => Some(HitPolicy::Collect),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HitPolicy::Unique => "UNIQUE",
            HitPolicy::First => "FIRST",
            HitPolicy::Priority => "PRIORITY",
            HitPolicy::Any => "ANY",
            HitPolicy::Collect => "COLLECT",
        }
    }

    /// Returns true if evaluation may stop at the first matching rule
    pub fn short_circuits(&self) -> bool {
        matches!(self, HitPolicy::First | HitPolicy::Priority)
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// FEEL expression together with the text it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct FeelExpression {
    pub source: String,
    pub expr: Expr,
}

/// Decision table input column
#[derive(Debug, Clone, PartialEq)]
pub struct TableInput {
    pub label: String,
    pub expression: FeelExpression,
}

/// Compiled decision-table cell.
///
/// `test` is `None` for the `-` wildcard; otherwise it is a boolean FEEL
/// expression over the `?` placeholder bound to the column's input value.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryTest {
    pub source: String,
    pub test: Option<Expr>,
}

/// Row-level guard of a decision table rule
#[derive(Debug, Clone, PartialEq)]
pub enum TableCondition {
    /// Boolean FEEL expression
    Feel(FeelExpression),
    /// JSON rule DSL condition
    Condition(Condition),
}

/// Decision table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRule {
    pub id: String,

    /// One cell per table input
    pub input_entries: Vec<UnaryTest>,

    pub condition: Option<TableCondition>,

    pub output: ThenClause,
}

/// Decision table
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    pub hit_policy: HitPolicy,
    pub inputs: Vec<TableInput>,
    pub rules: Vec<TableRule>,
}

/// Native decision function over the node's scope
pub type NativeFn =
    dyn Fn(&FeelContext) -> std::result::Result<FeelValue, String> + Send + Sync;

/// Function node logic
#[derive(Clone)]
pub enum DecisionFunction {
    /// `function(a, b) body`, called with the scope values named by its parameters
    Feel {
        params: Vec<String>,
        body: Expr,
        source: String,
    },

    /// Rust closure registered programmatically
    Native { name: String, func: Arc<NativeFn> },
}

impl DecisionFunction {
    pub fn native<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FeelContext) -> std::result::Result<FeelValue, String> + Send + Sync + 'static,
    {
        DecisionFunction::Native {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for DecisionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionFunction::Feel { params, source, .. } => f
                .debug_struct("Feel")
                .field("params", params)
                .field("source", source)
                .finish(),
            DecisionFunction::Native { name, .. } => {
                f.debug_struct("Native").field("name", name).finish()
            }
        }
    }
}

impl PartialEq for DecisionFunction {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                DecisionFunction::Feel { params, body, .. },
                DecisionFunction::Feel {
                    params: other_params,
                    body: other_body,
                    ..
                },
            ) => params == other_params && body == other_body,
            (
                DecisionFunction::Native { name, func },
                DecisionFunction::Native {
                    name: other_name,
                    func: other_func,
                },
            ) => name == other_name && Arc::ptr_eq(func, other_func),
            _ => false,
        }
    }
}

/// Node logic
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionLogic {
    Literal(FeelExpression),
    Table(DecisionTable),
    Function(DecisionFunction),
}

impl DecisionLogic {
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionLogic::Literal(_) => "literal",
            DecisionLogic::Table(_) => "table",
            DecisionLogic::Function(_) => "function",
        }
    }
}

/// Edge to another decision whose value is bound into this node's scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub decision_id: String,
    pub bound_name: String,
}

impl Dependency {
    /// Depend on `decision_id`, bound under the same name
    pub fn on(decision_id: impl Into<String>) -> Self {
        let decision_id = decision_id.into();
        Dependency {
            bound_name: decision_id.clone(),
            decision_id,
        }
    }

    pub fn bound_as(decision_id: impl Into<String>, bound_name: impl Into<String>) -> Self {
        Dependency {
            decision_id: decision_id.into(),
            bound_name: bound_name.into(),
        }
    }
}

/// Named decision
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub id: String,
    pub name: String,
    pub logic: DecisionLogic,
    /// Dependencies in binding order
    pub dependencies: Vec<Dependency>,
}

impl DecisionNode {
    pub fn new(id: impl Into<String>, logic: DecisionLogic) -> Self {
        let id = id.into();
        DecisionNode {
            name: id.clone(),
            id,
            logic,
            dependencies: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a dependency
    pub fn depends_on(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Parsed decision graph document, before dependency validation
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionGraphDefinition {
    pub name: String,
    pub decisions: Vec<DecisionNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_policy_names() {
        assert_eq!(HitPolicy::from_name("unique"), Some(HitPolicy::Unique));
        assert_eq!(HitPolicy::from_name(" COLLECT "), Some(HitPolicy::Collect));
        assert_eq!(HitPolicy::from_name("U"), None);
        assert_eq!(HitPolicy::default(), HitPolicy::First);
        assert!(HitPolicy::Priority.short_circuits());
        assert!(!HitPolicy::Any.short_circuits());
    }

    #[test]
    fn test_node_builder() {
        let node = DecisionNode::new(
            "risk",
            DecisionLogic::Literal(FeelExpression {
                source: "score > 10".to_string(),
                expr: Expr::field("score"),
            }),
        )
        .with_name("Risk level")
        .depends_on(Dependency::on("score"))
        .depends_on(Dependency::bound_as("history", "past"));

        assert_eq!(node.id, "risk");
        assert_eq!(node.name, "Risk level");
        assert_eq!(node.dependencies[1].bound_name, "past");
        assert_eq!(node.logic.kind(), "literal");
    }

    #[test]
    fn test_native_function_equality() {
        let f = DecisionFunction::native("double", |scope| {
            Ok(scope.get("x").cloned().unwrap_or_default())
        });
        let g = f.clone();
        let h = DecisionFunction::native("double", |_| Ok(FeelValue::Null));
        assert_eq!(f, g);
        assert_ne!(f, h);
        assert!(format!("{:?}", f).contains("double"));
    }
}
