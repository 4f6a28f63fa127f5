//! Explainability traces
//!
//! These structures record how a condition, ruleset or decision table reached
//! its result. They are plain serializable data attached to an
//! [`Evaluation`](super::Evaluation)'s metadata under the `trace` key.

use serde::{Deserialize, Serialize};
use verdict_core::FeelValue;

/// Trace of a single condition evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTrace {
    /// Human-readable form of the condition (e.g. `amount gt 1000`)
    pub expression: String,

    /// The resolved field value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// The predicate's expected value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_value: Option<serde_json::Value>,

    pub result: bool,

    /// Child traces of an `all`/`any` group, in evaluation order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<ConditionTrace>>,

    /// `"all"` or `"any"` for groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
}

impl ConditionTrace {
    pub fn new(expression: impl Into<String>, result: bool) -> Self {
        Self {
            expression: expression.into(),
            left_value: None,
            operator: None,
            right_value: None,
            result,
            nested: None,
            group_type: None,
        }
    }

    /// Trace of a `{field, op, value}` predicate
    pub fn predicate(
        field: &str,
        actual: &FeelValue,
        operator: &str,
        expected: &FeelValue,
        result: bool,
    ) -> Self {
        Self {
            expression: format!("{} {} {}", field, operator, expected),
            left_value: Some(actual.to_json()),
            operator: Some(operator.to_string()),
            right_value: Some(expected.to_json()),
            result,
            nested: None,
            group_type: None,
        }
    }

    /// Trace of an `all`/`any` group; `nested` holds only the children tested
    pub fn group(group_type: &str, nested: Vec<ConditionTrace>, result: bool) -> Self {
        Self {
            expression: format!("{}:[...]", group_type),
            left_value: None,
            operator: None,
            right_value: None,
            result,
            nested: Some(nested),
            group_type: Some(group_type.to_string()),
        }
    }
}

/// Trace of a single rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTrace {
    pub rule_id: String,

    pub matched: bool,

    pub condition: ConditionTrace,

    /// The rule's decision, when it matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}

impl RuleTrace {
    pub fn new(rule_id: impl Into<String>, condition: ConditionTrace) -> Self {
        Self {
            rule_id: rule_id.into(),
            matched: condition.result,
            condition,
            decision: None,
        }
    }

    pub fn with_decision(mut self, decision: impl Into<String>) -> Self {
        self.decision = Some(decision.into());
        self
    }
}

/// Trace of a ruleset evaluation; `rules` stops at the first match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetTrace {
    pub ruleset_name: String,

    pub version: String,

    pub rules: Vec<RuleTrace>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl RulesetTrace {
    pub fn new(ruleset_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            ruleset_name: ruleset_name.into(),
            version: version.into(),
            rules: Vec::new(),
            matched_rule: None,
        }
    }

    pub fn push_rule(&mut self, rule: RuleTrace) {
        if rule.matched && self.matched_rule.is_none() {
            self.matched_rule = Some(rule.rule_id.clone());
        }
        self.rules.push(rule);
    }

    /// Number of rules actually evaluated
    pub fn rules_evaluated(&self) -> usize {
        self.rules.len()
    }
}

/// Trace of one decision-table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTrace {
    pub rule_id: String,

    pub matched: bool,

    /// Result of each input entry, in input order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub input_entries: Vec<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionTrace>,
}

/// Trace of a decision-table evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableTrace {
    pub decision_id: String,

    pub hit_policy: String,

    /// Input expression values, in input order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub inputs: Vec<serde_json::Value>,

    pub rows: Vec<RowTrace>,
}

impl TableTrace {
    pub fn matched_rule_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.matched)
            .map(|row| row.rule_id.as_str())
            .collect()
    }
}
