//! Decision graph parser
//!
//! ```yaml
//! name: loan_approval
//! decisions:
//!   - id: debt_ratio
//!     literal: "debt / income"
//!   - id: risk
//!     dependencies: [debt_ratio]
//!     table:
//!       hit_policy: UNIQUE
//!       inputs: [debt_ratio]
//!       rules:
//!         - id: low
//!           input_entries: ["< 0.3"]
//!           then: {decision: low}
//!         - id: high
//!           input_entries: [">= 0.3"]
//!           then: {decision: high}
//!   - id: offer
//!     dependencies: [{decision: risk, as: level}]
//!     function: "function(level) if level = \"low\" then 0.05 else 0.09"
//! ```

use crate::document::DocumentParser;
use crate::error::DefinitionError;
use crate::feel::{compile_unary_test, FeelParser};
use crate::ruleset_parser::RulesetParser;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;
use verdict_core::ast::{
    DecisionFunction, DecisionGraphDefinition, DecisionLogic, DecisionNode, DecisionTable,
    Dependency, Expr, FeelExpression, HitPolicy, TableCondition, TableInput, TableRule,
};
use verdict_core::ConfigurationError;

const LOGIC_KINDS: [&str; 3] = ["literal", "table", "function"];

/// Decision graph parser
pub struct DecisionGraphParser;

impl DecisionGraphParser {
    /// Parse a decision graph from JSON or YAML text
    pub fn parse(text: &str) -> Result<DecisionGraphDefinition, DefinitionError> {
        let doc = DocumentParser::parse(text)?;
        Self::parse_from_value(&doc)
    }

    /// Parse a decision graph from an already loaded document
    pub fn parse_from_value(doc: &Value) -> Result<DecisionGraphDefinition, DefinitionError> {
        let name = DocumentParser::get_optional_string(doc, "name")
            .unwrap_or_else(|| "decision_graph".to_string());
        let location = format!("decision graph '{}'", name);

        let mut seen = HashSet::new();
        let mut decisions = Vec::new();
        for (index, value) in DocumentParser::get_array(doc, "decisions", &location)?
            .iter()
            .enumerate()
        {
            let node = Self::parse_decision(value, &format!("{} decision #{}", location, index + 1))?;
            if !seen.insert(node.id.clone()) {
                return Err(ConfigurationError::DuplicateId {
                    kind: "decision".to_string(),
                    id: node.id,
                }
                .into());
            }
            decisions.push(node);
        }

        Ok(DecisionGraphDefinition { name, decisions })
    }

    /// Parse one decision node
    pub fn parse_decision(value: &Value, location: &str) -> Result<DecisionNode, DefinitionError> {
        let id = DocumentParser::get_string(value, "id", location)?;
        let location = format!("decision '{}'", id);
        let name = DocumentParser::get_optional_string(value, "name").unwrap_or_else(|| id.clone());

        let present: Vec<&str> = LOGIC_KINDS
            .iter()
            .copied()
            .filter(|kind| DocumentParser::has_field(value, kind))
            .collect();
        let logic = match present.as_slice() {
            ["literal"] => {
                let source = DocumentParser::get_source(value, "literal", &location)?;
                DecisionLogic::Literal(feel_expression(&source, &location)?)
            }
            ["table"] => {
                let table = DocumentParser::get_object(value, "table", &location)?;
                DecisionLogic::Table(Self::parse_table(table, &location)?)
            }
            ["function"] => {
                let source = DocumentParser::get_source(value, "function", &location)?;
                DecisionLogic::Function(Self::parse_function(&source, &location)?)
            }
            [] => return Err(DocumentParser::missing(&location, "literal|table|function").into()),
            _ => {
                return Err(ConfigurationError::InvalidValue {
                    location,
                    field: present.join("|"),
                    message: "a decision has exactly one kind of logic".to_string(),
                }
                .into())
            }
        };

        let dependencies = DocumentParser::get_optional_array(value, "dependencies", &location)?
            .map(|deps| {
                deps.iter()
                    .map(|dep| Self::parse_dependency(dep, &location))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(DecisionNode {
            id,
            name,
            logic,
            dependencies,
        })
    }

    fn parse_dependency(value: &Value, location: &str) -> Result<Dependency, ConfigurationError> {
        match value {
            Value::String(id) => Ok(Dependency::on(id.clone())),
            Value::Object(_) => {
                let decision = DocumentParser::get_string(value, "decision", location)?;
                let bound = DocumentParser::get_optional_string(value, "as")
                    .unwrap_or_else(|| decision.clone());
                Ok(Dependency::bound_as(decision, bound))
            }
            other => Err(ConfigurationError::InvalidValue {
                location: location.to_string(),
                field: "dependencies".to_string(),
                message: format!("expected a decision id or {{decision, as}}, got {}", other),
            }),
        }
    }

    /// Parse a decision table body
    pub fn parse_table(value: &Value, location: &str) -> Result<DecisionTable, DefinitionError> {
        let hit_policy = match DocumentParser::get_optional_string(value, "hit_policy") {
            None => HitPolicy::default(),
            Some(name) => HitPolicy::from_name(&name).unwrap_or_else(|| {
                warn!(%location, policy = %name, "Unknown hit policy, using FIRST");
                HitPolicy::First
            }),
        };

        let inputs = DocumentParser::get_optional_array(value, "inputs", location)?
            .map(|inputs| {
                inputs
                    .iter()
                    .map(|input| Self::parse_input(input, location))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for (index, rule) in DocumentParser::get_array(value, "rules", location)?
            .iter()
            .enumerate()
        {
            let rule = Self::parse_table_rule(rule, inputs.len(), &format!("{} row #{}", location, index + 1))?;
            if !seen.insert(rule.id.clone()) {
                return Err(ConfigurationError::DuplicateId {
                    kind: "table rule".to_string(),
                    id: rule.id,
                }
                .into());
            }
            rules.push(rule);
        }

        Ok(DecisionTable {
            hit_policy,
            inputs,
            rules,
        })
    }

    fn parse_input(value: &Value, location: &str) -> Result<TableInput, DefinitionError> {
        let (label, source) = match value {
            Value::String(source) => (source.clone(), source.clone()),
            Value::Object(_) => {
                let source = DocumentParser::get_string(value, "expression", location)?;
                let label = DocumentParser::get_optional_string(value, "label")
                    .unwrap_or_else(|| source.clone());
                (label, source)
            }
            other => {
                return Err(ConfigurationError::InvalidValue {
                    location: location.to_string(),
                    field: "inputs".to_string(),
                    message: format!("expected an expression or {{label, expression}}, got {}", other),
                }
                .into())
            }
        };
        Ok(TableInput {
            expression: feel_expression(&source, &format!("{} input '{}'", location, label))?,
            label,
        })
    }

    fn parse_table_rule(
        value: &Value,
        input_count: usize,
        location: &str,
    ) -> Result<TableRule, DefinitionError> {
        let id = DocumentParser::get_string(value, "id", location)?;
        let location = format!("{} rule '{}'", location, id);

        let cells = DocumentParser::get_optional_array(value, "input_entries", &location)?;
        let input_entries = match cells {
            None => Vec::new(),
            Some(cells) => {
                if cells.len() != input_count {
                    return Err(ConfigurationError::InvalidValue {
                        location,
                        field: "input_entries".to_string(),
                        message: format!("expected {} cells, got {}", input_count, cells.len()),
                    }
                    .into());
                }
                cells
                    .iter()
                    .enumerate()
                    .map(|(column, cell)| {
                        let cell_location = format!("{} cell #{}", location, column + 1);
                        let source = DocumentParser::as_source(cell).ok_or_else(|| {
                            ConfigurationError::InvalidValue {
                                location: cell_location.clone(),
                                field: "input_entries".to_string(),
                                message: format!("expected a unary test, got {}", cell),
                            }
                        })?;
                        compile_unary_test(&source).map_err(|source| DefinitionError::Feel {
                            location: cell_location,
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let condition = match value.get("if") {
            None | Some(Value::Null) => None,
            Some(Value::String(source)) => {
                Some(TableCondition::Feel(feel_expression(source, &location)?))
            }
            Some(condition) => Some(TableCondition::Condition(RulesetParser::parse_condition(
                condition, &location,
            )?)),
        };

        let output = RulesetParser::parse_then(value, &location)?;

        Ok(TableRule {
            id,
            input_entries,
            condition,
            output,
        })
    }

    fn parse_function(source: &str, location: &str) -> Result<DecisionFunction, DefinitionError> {
        match feel_expression(source, location)?.expr {
            Expr::FunctionDefinition { params, body } => Ok(DecisionFunction::Feel {
                params,
                body: *body,
                source: source.to_string(),
            }),
            _ => Err(ConfigurationError::InvalidValue {
                location: location.to_string(),
                field: "function".to_string(),
                message: "expected a function definition: function(params) body".to_string(),
            }
            .into()),
        }
    }
}

fn feel_expression(source: &str, location: &str) -> Result<FeelExpression, DefinitionError> {
    let expr = FeelParser::parse(source).map_err(|source| DefinitionError::Feel {
        location: location.to_string(),
        source,
    })?;
    Ok(FeelExpression {
        source: source.to_string(),
        expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"
name: loan_approval
decisions:
  - id: debt_ratio
    literal: "debt / income"
  - id: risk
    dependencies: [debt_ratio]
    table:
      hit_policy: UNIQUE
      inputs: [debt_ratio]
      rules:
        - id: low
          input_entries: ["< 0.3"]
          then: {decision: low}
        - id: high
          input_entries: [">= 0.3"]
          then: {decision: high, weight: 0.8}
  - id: offer
    dependencies: [{decision: risk, as: level}]
    function: "function(level) if level = \"low\" then 0.05 else 0.09"
"#;

    #[test]
    fn test_parse_graph() {
        let graph = DecisionGraphParser::parse(GRAPH).unwrap();
        assert_eq!(graph.name, "loan_approval");
        assert_eq!(graph.decisions.len(), 3);

        let risk = &graph.decisions[1];
        assert_eq!(risk.dependencies, vec![Dependency::on("debt_ratio")]);
        match &risk.logic {
            DecisionLogic::Table(table) => {
                assert_eq!(table.hit_policy, HitPolicy::Unique);
                assert_eq!(table.inputs[0].label, "debt_ratio");
                assert_eq!(table.rules[1].output.weight, 0.8);
            }
            other => panic!("Expected table, got {:?}", other),
        }

        let offer = &graph.decisions[2];
        assert_eq!(offer.dependencies[0].bound_name, "level");
        match &offer.logic {
            DecisionLogic::Function(DecisionFunction::Feel { params, .. }) => {
                assert_eq!(params, &vec!["level".to_string()])
            }
            other => panic!("Expected FEEL function, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_hit_policy_defaults_to_first() {
        let json = r#"{"decisions": [{"id": "t", "table": {
            "hit_policy": "RULE ORDER",
            "rules": [{"id": "r", "then": {"decision": "x"}}]
        }}]}"#;
        let graph = DecisionGraphParser::parse(json).unwrap();
        match &graph.decisions[0].logic {
            DecisionLogic::Table(table) => assert_eq!(table.hit_policy, HitPolicy::First),
            other => panic!("Expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_logic_is_required_and_exclusive() {
        let none = r#"{"decisions": [{"id": "a"}]}"#;
        assert!(matches!(
            DecisionGraphParser::parse(none),
            Err(DefinitionError::Configuration(ConfigurationError::MissingField { .. }))
        ));
        let both = r#"{"decisions": [{"id": "a", "literal": "1", "function": "function() 1"}]}"#;
        assert!(DecisionGraphParser::parse(both).is_err());
    }

    #[test]
    fn test_cell_count_must_match_inputs() {
        let json = r#"{"decisions": [{"id": "t", "table": {
            "inputs": ["a", "b"],
            "rules": [{"id": "r", "input_entries": ["1"], "then": {"decision": "x"}}]
        }}]}"#;
        assert!(matches!(
            DecisionGraphParser::parse(json),
            Err(DefinitionError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_bad_feel_reports_location() {
        let json = r#"{"decisions": [{"id": "a", "literal": "1 +"}]}"#;
        match DecisionGraphParser::parse(json) {
            Err(DefinitionError::Feel { location, .. }) => assert!(location.contains("'a'")),
            other => panic!("Expected FEEL error, got {:?}", other),
        }
    }

    #[test]
    fn test_function_logic_must_define_function() {
        let json = r#"{"decisions": [{"id": "a", "function": "1 + 2"}]}"#;
        assert!(DecisionGraphParser::parse(json).is_err());
    }

    #[test]
    fn test_duplicate_decisions() {
        let json = r#"{"decisions": [{"id": "a", "literal": "1"}, {"id": "a", "literal": "2"}]}"#;
        assert!(matches!(
            DecisionGraphParser::parse(json),
            Err(DefinitionError::Configuration(ConfigurationError::DuplicateId { .. }))
        ));
    }
}
