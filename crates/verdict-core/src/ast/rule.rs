//! Rule DSL definitions
//!
//! A ruleset is an ordered list of rules. Each rule pairs a [`Condition`]
//! with a [`ThenClause`]; the first rule whose condition holds wins.

use crate::types::FeelValue;
use serde::{Deserialize, Serialize};

/// Declarative condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Every child must hold (vacuously true when empty)
    All { all: Vec<Condition> },

    /// At least one child must hold (vacuously false when empty)
    Any { any: Vec<Condition> },

    /// `{field, op, value}` predicate
    Predicate(FieldPredicate),
}

/// Predicate over one field of the input context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPredicate {
    /// Dotted field path (e.g., `user.address.country`)
    pub field: String,

    /// Operator name (e.g., `eq`, `within_radius`)
    pub op: String,

    /// Expected value; its shape depends on the operator
    #[serde(default)]
    pub value: FeelValue,
}

/// Outcome proposed when a rule matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThenClause {
    pub decision: String,

    /// Weight in `[0, 1]`
    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default)]
    pub reason: String,
}

/// Rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule ID
    pub id: String,

    /// Condition that must hold for the rule to fire
    #[serde(rename = "if")]
    pub condition: Condition,

    /// Outcome when the rule fires
    #[serde(rename = "then")]
    pub outcome: ThenClause,
}

/// Ordered rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub version: String,

    /// Ruleset name
    #[serde(rename = "ruleset")]
    pub name: String,

    /// Rules in evaluation order
    pub rules: Vec<Rule>,
}

fn default_weight() -> f64 {
    1.0
}

impl Condition {
    pub fn predicate(field: impl Into<String>, op: impl Into<String>, value: FeelValue) -> Self {
        Condition::Predicate(FieldPredicate {
            field: field.into(),
            op: op.into(),
            value,
        })
    }

    pub fn all(children: Vec<Condition>) -> Self {
        Condition::All { all: children }
    }

    pub fn any(children: Vec<Condition>) -> Self {
        Condition::Any { any: children }
    }
}

impl ThenClause {
    pub fn new(decision: impl Into<String>, weight: f64) -> Self {
        ThenClause {
            decision: decision.into(),
            weight,
            reason: String::new(),
        }
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl Rule {
    pub fn new(id: impl Into<String>, condition: Condition, outcome: ThenClause) -> Self {
        Rule {
            id: id.into(),
            condition,
            outcome,
        }
    }
}

impl Ruleset {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Ruleset {
            version: "1.0".to_string(),
            name: name.into(),
            rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_deserialize() {
        let condition: Condition = serde_json::from_value(json!({
            "all": [
                {"field": "user.age", "op": "gte", "value": 18},
                {"any": []}
            ]
        }))
        .unwrap();

        match condition {
            Condition::All { all } => {
                assert_eq!(all.len(), 2);
                assert_eq!(
                    all[0],
                    Condition::predicate("user.age", "gte", FeelValue::from(18_i64))
                );
                assert_eq!(all[1], Condition::any(vec![]));
            }
            other => panic!("Expected All condition, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule: Rule = serde_json::from_value(json!({
            "id": "adult",
            "if": {"field": "age", "op": "gte", "value": 18},
            "then": {"decision": "approve"}
        }))
        .unwrap();

        assert_eq!(rule.id, "adult");
        assert_eq!(rule.outcome.weight, 1.0);
        assert!(rule.outcome.reason.is_empty());
    }

    #[test]
    fn test_ruleset_field_names() {
        let ruleset = Ruleset::new(
            "loans",
            vec![Rule::new(
                "r1",
                Condition::all(vec![]),
                ThenClause::new("approve", 0.8).with_reason("always"),
            )],
        );
        let value = serde_json::to_value(&ruleset).unwrap();
        assert_eq!(value["ruleset"], "loans");
        assert_eq!(value["rules"][0]["then"]["decision"], "approve");
        assert!(value["rules"][0]["if"]["all"].is_array());
    }
}
