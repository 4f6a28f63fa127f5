//! The evaluator abstraction consumed by agents

use crate::context::Context;
use crate::error::Result;
use crate::result::Evaluation;

/// A source of decision proposals.
///
/// Implementations are synchronous and side-effect free; `Ok(None)` means the
/// evaluator has no opinion on this context.
pub trait Evaluator: Send + Sync {
    /// Name recorded on produced evaluations and in logs
    fn name(&self) -> &str;

    fn evaluate(&self, context: &Context) -> Result<Option<Evaluation>>;
}
