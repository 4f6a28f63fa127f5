//! Abstract Syntax Tree (AST) definitions for Verdict
//!
//! This module contains the AST node definitions for:
//! - FEEL expressions
//! - Rules and rulesets (JSON rule DSL)
//! - Decision nodes and decision tables

pub mod decision;
pub mod expression;
pub mod operator;
pub mod rule;

pub use decision::{
    DecisionFunction, DecisionGraphDefinition, DecisionLogic, DecisionNode, DecisionTable, Dependency, FeelExpression,
    HitPolicy, NativeFn, TableCondition, TableInput, TableRule, UnaryTest,
};
pub use expression::{Expr, FeelType};
pub use operator::{ArithmeticOp, ComparisonOp, LogicalOp, Quantifier};
pub use rule::{Condition, FieldPredicate, Rule, Ruleset, ThenClause};
