//! Hit-policy reconciliation of matched table rows

use crate::result::Evaluation;
use serde_json::json;
use verdict_core::ast::{HitPolicy, TableRule};
use verdict_core::ConfigurationError;

/// Reduce the matched rows of table `table` to at most one evaluation.
///
/// `matches` is in declared order. For short-circuiting policies it holds at
/// most one row.
pub(crate) fn apply(
    policy: HitPolicy,
    table: &str,
    matches: &[&TableRule],
) -> Result<Option<Evaluation>, ConfigurationError> {
    match policy {
        HitPolicy::Unique => match matches {
            [only] => Ok(Some(evaluation(only))),
            _ => Err(ConfigurationError::UniqueViolation {
                table: table.to_string(),
                rule_ids: rule_ids(matches),
            }),
        },
        HitPolicy::First | HitPolicy::Priority => Ok(matches.first().map(|rule| evaluation(rule))),
        HitPolicy::Any => {
            let Some(first) = matches.first() else {
                return Ok(None);
            };
            let decisions = distinct_decisions(matches);
            if decisions.len() > 1 {
                return Err(ConfigurationError::AnyConflict {
                    table: table.to_string(),
                    rule_ids: rule_ids(matches),
                    decisions,
                });
            }
            Ok(Some(evaluation(first)))
        }
        HitPolicy::Collect => Ok(matches.first().map(|first| {
            evaluation(first)
                .with_metadata("matched_rule_ids", json!(rule_ids(matches)))
                .with_metadata(
                    "matched_decisions",
                    json!(matches.iter().map(|r| r.output.decision.as_str()).collect::<Vec<_>>()),
                )
        })),
    }
}

fn evaluation(rule: &TableRule) -> Evaluation {
    Evaluation::from_then(&rule.output).with_metadata("rule_id", json!(rule.id))
}

fn rule_ids(matches: &[&TableRule]) -> Vec<String> {
    matches.iter().map(|rule| rule.id.clone()).collect()
}

/// Distinct decisions, in first-seen order
fn distinct_decisions(matches: &[&TableRule]) -> Vec<String> {
    let mut decisions: Vec<String> = Vec::new();
    for rule in matches {
        if !decisions.contains(&rule.output.decision) {
            decisions.push(rule.output.decision.clone());
        }
    }
    decisions
}
