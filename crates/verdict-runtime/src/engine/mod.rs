//! Rule matching engine
//!
//! Runs an ordered [`Ruleset`](verdict_core::ast::Ruleset) against a context
//! with first-match semantics.

mod rule_engine;

pub use rule_engine::RuleEngine;
