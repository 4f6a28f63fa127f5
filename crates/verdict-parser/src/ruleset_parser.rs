//! Ruleset parser
//!
//! Parses JSON rule DSL documents (or their YAML equivalent):
//!
//! ```json
//! {"version": "1.0", "ruleset": "kyc", "rules": [
//!   {"id": "r1", "if": {"field": "age", "op": "gte", "value": 18},
//!    "then": {"decision": "approve", "weight": 0.9, "reason": "adult"}}
//! ]}
//! ```

use crate::document::DocumentParser;
use crate::error::DefinitionError;
use serde_json::Value;
use std::collections::HashSet;
use verdict_core::ast::{Condition, FieldPredicate, Rule, Ruleset, ThenClause};
use verdict_core::{ConfigurationError, FeelValue};

/// Ruleset parser
pub struct RulesetParser;

impl RulesetParser {
    /// Parse a ruleset from JSON or YAML text
    pub fn parse(text: &str) -> Result<Ruleset, DefinitionError> {
        let doc = DocumentParser::parse(text)?;
        Ok(Self::parse_from_value(&doc)?)
    }

    /// Parse a ruleset from an already loaded document
    pub fn parse_from_value(doc: &Value) -> Result<Ruleset, ConfigurationError> {
        let name = DocumentParser::get_string(doc, "ruleset", "ruleset")?;
        let location = format!("ruleset '{}'", name);

        let version = match doc.get("version") {
            None | Some(Value::Null) => "1.0".to_string(),
            Some(value) => DocumentParser::as_source(value).ok_or_else(|| {
                ConfigurationError::InvalidValue {
                    location: location.clone(),
                    field: "version".to_string(),
                    message: format!("expected a string, got {}", value),
                }
            })?,
        };

        let mut seen = HashSet::new();
        let rules = DocumentParser::get_array(doc, "rules", &location)?
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let rule = Self::parse_rule(rule, &format!("{} rule #{}", location, index + 1))?;
                if !seen.insert(rule.id.clone()) {
                    return Err(ConfigurationError::DuplicateId {
                        kind: "rule".to_string(),
                        id: rule.id,
                    });
                }
                Ok(rule)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Ruleset {
            version,
            name,
            rules,
        })
    }

    fn parse_rule(value: &Value, location: &str) -> Result<Rule, ConfigurationError> {
        let id = DocumentParser::get_string(value, "id", location)?;
        let location = format!("rule '{}'", id);

        let condition = match value.get("if") {
            Some(condition) => Self::parse_condition(condition, &location)?,
            None => return Err(DocumentParser::missing(&location, "if")),
        };
        let outcome = Self::parse_then(value, &location)?;

        Ok(Rule {
            id,
            condition,
            outcome,
        })
    }

    /// Parse the `then` clause of a rule or decision table row
    pub fn parse_then(value: &Value, location: &str) -> Result<ThenClause, ConfigurationError> {
        let then = DocumentParser::get_object(value, "then", location)?;
        let decision = match DocumentParser::get_string(then, "decision", location) {
            Err(ConfigurationError::MissingField { location, .. }) => {
                return Err(ConfigurationError::MissingField {
                    location,
                    field: "then.decision".to_string(),
                })
            }
            other => other?,
        };
        let weight = DocumentParser::get_unit_interval(then, "weight", location)?.unwrap_or(1.0);
        let reason = DocumentParser::get_optional_string(then, "reason").unwrap_or_default();

        Ok(ThenClause {
            decision,
            weight,
            reason,
        })
    }

    /// Parse a condition object: `{"all": [...]}`, `{"any": [...]}` or
    /// `{"field": ..., "op": ..., "value": ...}`
    pub fn parse_condition(value: &Value, location: &str) -> Result<Condition, ConfigurationError> {
        if !value.is_object() {
            return Err(ConfigurationError::InvalidValue {
                location: location.to_string(),
                field: "if".to_string(),
                message: format!("expected a condition object, got {}", value),
            });
        }

        if DocumentParser::has_field(value, "all") {
            let children = DocumentParser::get_array(value, "all", location)?
                .iter()
                .map(|child| Self::parse_condition(child, location))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Condition::All { all: children });
        }

        if DocumentParser::has_field(value, "any") {
            let children = DocumentParser::get_array(value, "any", location)?
                .iter()
                .map(|child| Self::parse_condition(child, location))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Condition::Any { any: children });
        }

        Ok(Condition::Predicate(FieldPredicate {
            field: DocumentParser::get_string(value, "field", location)?,
            op: DocumentParser::get_string(value, "op", location)?,
            value: value.get("value").map(FeelValue::from_json).unwrap_or_default(),
        }))
    }
}
