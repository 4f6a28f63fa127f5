//! FEEL expression evaluation
//!
//! - [`FeelEvaluator`]: evaluates parsed expressions and unary tests
//! - Built-in function catalog
//! - Arithmetic, comparison and temporal rules

mod arithmetic;
mod builtins;
mod evaluator;
mod scope;

pub use builtins::BUILTIN_FUNCTIONS;
pub use evaluator::FeelEvaluator;
