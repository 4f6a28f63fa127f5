//! Verdict Runtime - Evaluation engine for Verdict decisions
//!
//! This crate evaluates parsed definitions against input data:
//! - FEEL expression evaluation with built-in functions
//! - Condition evaluation through categorized operator dispatch
//! - First-match rule engine over JSON/YAML rulesets
//! - Decision graphs with decision tables and hit policies

pub mod condition;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod feel;
pub mod graph;
pub mod result;

// Re-export main types
pub use condition::{CacheStats, ConditionCaches, ConditionEvaluator, Dispatch, OperatorCategory};
pub use context::Context;
pub use engine::RuleEngine;
pub use error::{Result, RuntimeError};
pub use evaluator::Evaluator;
pub use feel::{FeelEvaluator, BUILTIN_FUNCTIONS};
pub use graph::{DecisionGraph, DecisionGraphEvaluator, DecisionOutcome};
pub use result::{ConditionTrace, Evaluation, RowTrace, RuleTrace, RulesetTrace, TableTrace};
