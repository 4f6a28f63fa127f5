//! Decision table row matching

use crate::condition::ConditionEvaluator;
use crate::context::Context;
use crate::error::Result;
use crate::feel::FeelEvaluator;
use crate::result::{RowTrace, TableTrace};
use verdict_core::ast::{DecisionTable, TableCondition, TableRule};
use verdict_core::{ConfigurationError, FeelValue};

/// Rows of `table` that match `scope`, in declared order, with the trace.
///
/// Rows are tested in order; short-circuiting hit policies stop at the first
/// match and later rows are neither tested nor traced.
pub(crate) fn matching_rows<'t>(
    decision_id: &str,
    table: &'t DecisionTable,
    scope: &Context,
    conditions: &ConditionEvaluator,
) -> Result<(Vec<&'t TableRule>, TableTrace)> {
    let inputs = table
        .inputs
        .iter()
        .map(|input| FeelEvaluator::evaluate(&input.expression.expr, scope))
        .collect::<Result<Vec<_>>>()?;

    let mut trace = TableTrace {
        decision_id: decision_id.to_string(),
        hit_policy: table.hit_policy.name().to_string(),
        inputs: inputs.iter().map(FeelValue::to_json).collect(),
        rows: Vec::with_capacity(table.rules.len()),
    };
    let mut matches = Vec::new();

    for rule in &table.rules {
        let row = test_row(decision_id, rule, &inputs, scope, conditions)?;
        let matched = row.matched;
        trace.rows.push(row);
        if matched {
            matches.push(rule);
            if table.hit_policy.short_circuits() {
                break;
            }
        }
    }

    Ok((matches, trace))
}

fn test_row(
    decision_id: &str,
    rule: &TableRule,
    inputs: &[FeelValue],
    scope: &Context,
    conditions: &ConditionEvaluator,
) -> Result<RowTrace> {
    if !rule.input_entries.is_empty() && rule.input_entries.len() != inputs.len() {
        return Err(ConfigurationError::InvalidValue {
            location: format!("decision '{}' rule '{}'", decision_id, rule.id),
            field: "input_entries".to_string(),
            message: format!(
                "expected {} entries, got {}",
                inputs.len(),
                rule.input_entries.len()
            ),
        }
        .into());
    }

    let mut row = RowTrace {
        rule_id: rule.id.clone(),
        matched: false,
        input_entries: Vec::with_capacity(rule.input_entries.len()),
        condition: None,
    };

    for (test, input) in rule.input_entries.iter().zip(inputs) {
        let holds = FeelEvaluator::evaluate_unary_test(test, input, scope)?;
        row.input_entries.push(holds);
        if !holds {
            return Ok(row);
        }
    }

    row.matched = match &rule.condition {
        None => true,
        Some(TableCondition::Feel(guard)) => {
            matches!(FeelEvaluator::evaluate(&guard.expr, scope)?, FeelValue::Boolean(true))
        }
        Some(TableCondition::Condition(condition)) => {
            let (holds, condition_trace) = conditions.evaluate_with_trace(condition, scope);
            row.condition = Some(condition_trace);
            holds
        }
    };
    Ok(row)
}
