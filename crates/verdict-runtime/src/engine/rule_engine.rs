use crate::condition::ConditionEvaluator;
use crate::context::Context;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::result::{Evaluation, RuleTrace, RulesetTrace};
use std::time::Instant;
use tracing::{debug, warn};
use verdict_core::ast::{Condition, Ruleset};

/// First-match rule engine over an immutable ruleset
#[derive(Debug, Clone)]
pub struct RuleEngine {
    ruleset: Ruleset,
    conditions: ConditionEvaluator,
}

impl RuleEngine {
    /// Engine using the process-wide condition caches
    pub fn new(ruleset: Ruleset) -> Self {
        Self::with_evaluator(ruleset, ConditionEvaluator::new())
    }

    pub fn with_evaluator(ruleset: Ruleset, conditions: ConditionEvaluator) -> Self {
        for rule in &ruleset.rules {
            for op in unknown_operators(&rule.condition) {
                warn!(
                    "Rule '{}' in ruleset '{}' uses unknown operator '{}'; it will never match",
                    rule.id, ruleset.name, op
                );
            }
        }
        Self { ruleset, conditions }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Evaluation of the first matching rule, with its trace in the metadata
    pub fn evaluate(&self, context: &Context) -> Option<Evaluation> {
        let (evaluation, _) = self.evaluate_with_trace(context);
        evaluation
    }

    /// Evaluate rules in order, stopping at the first match.
    ///
    /// The trace covers every rule tested up to and including the match.
    pub fn evaluate_with_trace(&self, context: &Context) -> (Option<Evaluation>, RulesetTrace) {
        let start = Instant::now();
        let mut trace = RulesetTrace::new(&self.ruleset.name, &self.ruleset.version);

        for rule in &self.ruleset.rules {
            let (matched, condition) = self.conditions.evaluate_with_trace(&rule.condition, context);
            if !matched {
                trace.push_rule(RuleTrace::new(&rule.id, condition));
                continue;
            }

            trace.push_rule(RuleTrace::new(&rule.id, condition).with_decision(&rule.outcome.decision));
            debug!(
                ruleset = %self.ruleset.name,
                rule_id = %rule.id,
                decision = %rule.outcome.decision,
                rules_evaluated = trace.rules_evaluated(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "Rule matched"
            );
            let evaluation = Evaluation::from_then(&rule.outcome)
                .with_evaluator_name(&self.ruleset.name)
                .with_metadata("ruleset", serde_json::json!(self.ruleset.name))
                .with_metadata("version", serde_json::json!(self.ruleset.version))
                .with_metadata("rule_id", serde_json::json!(rule.id))
                .with_metadata("trace", serde_json::to_value(&trace).unwrap_or_default());
            return (Some(evaluation), trace);
        }

        debug!(
            ruleset = %self.ruleset.name,
            rules_evaluated = trace.rules_evaluated(),
            "No rule matched"
        );
        (None, trace)
    }
}

impl Evaluator for RuleEngine {
    fn name(&self) -> &str {
        &self.ruleset.name
    }

    fn evaluate(&self, context: &Context) -> Result<Option<Evaluation>> {
        Ok(RuleEngine::evaluate(self, context))
    }
}

fn unknown_operators(condition: &Condition) -> Vec<&str> {
    match condition {
        Condition::All { all: children } | Condition::Any { any: children } => {
            children.iter().flat_map(unknown_operators).collect()
        }
        Condition::Predicate(predicate) if !ConditionEvaluator::is_supported(&predicate.op) => {
            vec![predicate.op.as_str()]
        }
        Condition::Predicate(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_core::ast::{Rule, ThenClause};
    use verdict_core::FeelValue;

    fn ruleset() -> Ruleset {
        Ruleset::new(
            "loan",
            vec![
                Rule::new(
                    "big",
                    Condition::predicate("amount", "gt", FeelValue::from(10_000_i64)),
                    ThenClause::new("review", 0.8).with_reason("large amount"),
                ),
                Rule::new(
                    "adult",
                    Condition::predicate("age", "gte", FeelValue::from(18_i64)),
                    ThenClause::new("approve", 0.6),
                ),
                Rule::new(
                    "fallback",
                    Condition::all(vec![]),
                    ThenClause::new("deny", 0.5),
                ),
            ],
        )
    }

    #[test]
    fn test_first_match_wins() {
        let engine = RuleEngine::new(ruleset());
        let ctx = Context::from_json(&json!({"amount": 500, "age": 30})).unwrap();
        let evaluation = engine.evaluate(&ctx).unwrap();
        assert_eq!(evaluation.decision(), "approve");
        assert_eq!(evaluation.rule_id(), Some("adult"));
        assert_eq!(evaluation.evaluator_name(), "loan");
    }

    #[test]
    fn test_trace_excludes_later_rules() {
        let engine = RuleEngine::new(ruleset());
        let ctx = Context::from_json(&json!({"amount": 500, "age": 30})).unwrap();
        let (_, trace) = engine.evaluate_with_trace(&ctx);
        let ids: Vec<_> = trace.rules.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["big", "adult"]);
        assert_eq!(trace.matched_rule.as_deref(), Some("adult"));
    }

    #[test]
    fn test_no_match_without_fallback() {
        let mut rules = ruleset();
        rules.rules.pop();
        let engine = RuleEngine::new(rules);
        let ctx = Context::from_json(&json!({"amount": 5, "age": 12})).unwrap();
        assert!(engine.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_unknown_operator_collected() {
        let condition = Condition::any(vec![
            Condition::predicate("a", "eq", FeelValue::Null),
            Condition::predicate("b", "approximately", FeelValue::Null),
        ]);
        assert_eq!(unknown_operators(&condition), vec!["approximately"]);
    }
}
