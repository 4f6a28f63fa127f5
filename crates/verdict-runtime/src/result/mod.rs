//! Evaluation results and explainability traces

mod evaluation;
mod trace;

pub use evaluation::Evaluation;
pub use trace::{ConditionTrace, RowTrace, RuleTrace, RulesetTrace, TableTrace};
