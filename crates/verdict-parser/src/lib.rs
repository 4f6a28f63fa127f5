//! Verdict Parser - FEEL and definition parsers for the Verdict decision engine
//!
//! This crate provides:
//! - The FEEL expression front end (lexer, grammar parser, transformer, fast path)
//! - The decision table unary-test compiler
//! - JSON/YAML parsers for rulesets and decision graphs

pub mod decision_parser;
pub mod document;
pub mod error;
pub mod feel;
pub mod ruleset_parser;

// Re-export main parser types
pub use decision_parser::DecisionGraphParser;
pub use document::DocumentParser;
pub use error::{DefinitionError, FeelError, ParseError, TransformError};
pub use feel::{compile_unary_test, FeelParser, INPUT_PLACEHOLDER};
pub use ruleset_parser::RulesetParser;
