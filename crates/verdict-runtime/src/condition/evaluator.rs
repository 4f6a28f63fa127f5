use super::cache::ConditionCaches;
use super::dispatch::{dispatch, OperatorCategory};
use crate::context::Context;
use crate::result::ConditionTrace;
use std::sync::Arc;
use tracing::{debug, warn};
use verdict_core::ast::{Condition, FieldPredicate};
use verdict_core::FeelValue;

/// Evaluates declarative conditions against a context.
///
/// Cheap to clone; clones share the same caches.
#[derive(Clone)]
pub struct ConditionEvaluator {
    caches: Arc<ConditionCaches>,
}

impl ConditionEvaluator {
    /// Evaluator backed by the process-wide caches
    pub fn new() -> Self {
        Self::with_caches(ConditionCaches::global())
    }

    pub fn with_caches(caches: Arc<ConditionCaches>) -> Self {
        Self { caches }
    }

    pub fn caches(&self) -> &ConditionCaches {
        &self.caches
    }

    /// Whether any operator category owns `op`
    pub fn is_supported(op: &str) -> bool {
        OperatorCategory::of(op).is_some()
    }

    pub fn evaluate(&self, condition: &Condition, context: &Context) -> bool {
        match condition {
            Condition::All { all } => all.iter().all(|child| self.evaluate(child, context)),
            Condition::Any { any } => any.iter().any(|child| self.evaluate(child, context)),
            Condition::Predicate(predicate) => self.evaluate_field(predicate, context).0,
        }
    }

    /// Evaluate and record every predicate tested.
    ///
    /// Groups short-circuit exactly as [`evaluate`](Self::evaluate) does, so
    /// the trace lists only the children that were evaluated.
    pub fn evaluate_with_trace(&self, condition: &Condition, context: &Context) -> (bool, ConditionTrace) {
        match condition {
            Condition::All { all } => {
                let mut nested = Vec::with_capacity(all.len());
                let mut result = true;
                for child in all {
                    let (holds, trace) = self.evaluate_with_trace(child, context);
                    nested.push(trace);
                    if !holds {
                        result = false;
                        break;
                    }
                }
                (result, ConditionTrace::group("all", nested, result))
            }
            Condition::Any { any } => {
                let mut nested = Vec::with_capacity(any.len());
                let mut result = false;
                for child in any {
                    let (holds, trace) = self.evaluate_with_trace(child, context);
                    nested.push(trace);
                    if holds {
                        result = true;
                        break;
                    }
                }
                (result, ConditionTrace::group("any", nested, result))
            }
            Condition::Predicate(predicate) => {
                let (result, actual) = self.evaluate_field(predicate, context);
                let trace = ConditionTrace::predicate(
                    &predicate.field,
                    &actual,
                    &predicate.op,
                    &predicate.value,
                    result,
                );
                (result, trace)
            }
        }
    }

    /// Apply `op` to an already-resolved value
    pub fn evaluate_predicate(&self, op: &str, actual: &FeelValue, expected: &FeelValue) -> bool {
        match dispatch(op, actual, expected, &self.caches) {
            Some((category, result)) => {
                debug!(op, category = category.name(), result, "Predicate evaluated");
                result
            }
            None => {
                warn!("Unknown operator '{}', evaluating to false", op);
                false
            }
        }
    }

    /// Value at a dotted field path; null when any segment is missing
    pub fn resolve(&self, field: &str, context: &Context) -> FeelValue {
        context.lookup_segments(&self.caches.path(field)[..])
    }

    fn evaluate_field(&self, predicate: &FieldPredicate, context: &Context) -> (bool, FeelValue) {
        let actual = self.resolve(&predicate.field, context);
        let result = self.evaluate_predicate(&predicate.op, &actual, &predicate.value);
        (result, actual)
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConditionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionEvaluator")
            .field("caches", &self.caches.stats())
            .finish()
    }
}
