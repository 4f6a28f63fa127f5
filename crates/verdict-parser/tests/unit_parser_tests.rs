//! Unit tests for the FEEL front end and definition parsers
//!
//! Tests the parsing functionality for expressions, unary tests, rulesets
//! and decision graphs through the crate's public API.

use verdict_core::ast::*;
use verdict_core::ConfigurationError;
use verdict_parser::feel::ParseNode;
use verdict_parser::*;

// =============================================================================
// Expression Tests
// =============================================================================

#[test]
fn test_parse_full_grammar_forms() {
    let sources = [
        "[1, 2, 3]",
        "[]",
        "{a: 1, \"b\": [true, null]}",
        "[1..10]",
        "(0..1]",
        "x between 1 and 10",
        "x in [1, 2]",
        "x instance of string",
        "if a > 1 then \"big\" else \"small\"",
        "some x in [1, 5, 10] satisfies x > 8",
        "every x in items satisfies x.ok",
        "for x in [1, 2] return x * 2",
        "function(a, b) a + b",
        "substring(name, 1, 3)",
        "orders[amount > 100].id",
        "orders[1]",
    ];
    for source in sources {
        let result = FeelParser::parse(source);
        assert!(result.is_ok(), "Failed to parse {}: {:?}", source, result.err());
    }
}

#[test]
fn test_between_binds_tighter_than_and() {
    let expr = FeelParser::parse("x between 1 and 10 and y").unwrap();
    match expr {
        Expr::Logical {
            op: LogicalOp::And,
            operands,
        } => {
            assert!(matches!(operands[0], Expr::Between { .. }));
            assert_eq!(operands[1], Expr::field("y"));
        }
        other => panic!("Expected conjunction, got {:?}", other),
    }
}

#[test]
fn test_no_scaffolding_survives() {
    let expr = FeelParser::parse("((-(3)))").unwrap();
    assert_eq!(expr, Expr::number(-3));
}

#[test]
fn test_parse_error_position() {
    match FeelParser::parse("a > > b") {
        Err(FeelError::Parse(err)) => {
            assert_eq!(err.position, 4);
            assert_eq!(err.character, Some('>'));
        }
        other => panic!("Expected parse error, got {:?}", other),
    }
}

#[test]
fn test_deep_nesting_is_a_parse_error() {
    let source = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    match FeelParser::parse(&source) {
        Err(FeelError::Parse(err)) => {
            assert!(err.message.contains("nested too deeply"));
            assert_eq!(err.position, feel::parser::MAX_NESTING);
        }
        other => panic!("Expected parse error, got {:?}", other),
    }
    assert!(FeelParser::parse(&format!("{}x", "-".repeat(5_000))).is_err());
}

#[test]
fn test_transform_error_wraps_subtree() {
    match FeelParser::parse("x instance of widget") {
        Err(FeelError::Transform(err)) => {
            assert!(err.subtree.contains("InstanceOf"));
        }
        other => panic!("Expected transform error, got {:?}", other),
    }
}

#[test]
fn test_raw_tree_keeps_groups() {
    let tree = FeelParser::parse_tree("(a)").unwrap();
    assert!(matches!(tree, ParseNode::Group(_)));
}

// =============================================================================
// Unary Test Tests
// =============================================================================

#[test]
fn test_unary_test_sources_are_trimmed() {
    let test = compile_unary_test("  >= 18  ").unwrap();
    assert_eq!(test.source, ">= 18");
    assert!(test.test.unwrap().references(INPUT_PLACEHOLDER));
}

#[test]
fn test_unary_test_names_are_free() {
    let test = compile_unary_test("gold").unwrap();
    let names = test.test.unwrap().free_names();
    assert!(names.contains("gold"));
    assert!(names.contains(INPUT_PLACEHOLDER));
}

// =============================================================================
// Ruleset Parser Tests
// =============================================================================

#[test]
fn test_parse_ruleset_with_nested_conditions() -> anyhow::Result<()> {
    let yaml = r#"
version: "2.0"
ruleset: fraud
rules:
  - id: velocity
    if:
      all:
        - field: tx.count_1h
          op: gt
          value: 10
        - any:
            - field: tx.country
              op: not_in
              value: [US, CA]
            - field: device.new
              op: eq
              value: true
    then:
      decision: review
      weight: 0.7
      reason: High velocity
"#;

    let ruleset = RulesetParser::parse(yaml)?;
    assert_eq!(ruleset.version, "2.0");
    assert_eq!(ruleset.rules[0].outcome.reason, "High velocity");
    match &ruleset.rules[0].condition {
        Condition::All { all } => {
            assert_eq!(all.len(), 2);
            assert!(matches!(all[1], Condition::Any { .. }));
        }
        other => panic!("Expected all-condition, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_ruleset_requires_name_and_rules() {
    assert!(matches!(
        RulesetParser::parse(r#"{"rules": []}"#),
        Err(DefinitionError::Configuration(ConfigurationError::MissingField { .. }))
    ));
    assert!(matches!(
        RulesetParser::parse(r#"{"ruleset": "x"}"#),
        Err(DefinitionError::Configuration(ConfigurationError::MissingField { .. }))
    ));
}

// =============================================================================
// Decision Graph Parser Tests
// =============================================================================

#[test]
fn test_decision_table_row_conditions() -> anyhow::Result<()> {
    let json = r#"{
        "name": "pricing",
        "decisions": [{
            "id": "tier",
            "table": {
                "hit_policy": "collect",
                "inputs": [{"label": "Spend", "expression": "customer.spend"}],
                "rules": [
                    {"id": "feel_guard", "input_entries": [">= 1000"], "if": "customer.active",
                     "then": {"decision": "gold"}},
                    {"id": "dsl_guard", "input_entries": ["-"],
                     "if": {"field": "customer.vip", "op": "eq", "value": true},
                     "then": {"decision": "gold", "weight": 0.5}}
                ]
            }
        }]
    }"#;

    let graph = DecisionGraphParser::parse(json)?;
    let table = match &graph.decisions[0].logic {
        DecisionLogic::Table(table) => table,
        other => panic!("Expected table, got {:?}", other),
    };
    assert_eq!(table.hit_policy, HitPolicy::Collect);
    assert_eq!(table.inputs[0].label, "Spend");
    assert!(matches!(table.rules[0].condition, Some(TableCondition::Feel(_))));
    assert!(matches!(table.rules[1].condition, Some(TableCondition::Condition(_))));
    assert!(table.rules[1].input_entries[0].test.is_none());
    Ok(())
}

#[test]
fn test_numeric_cells_are_accepted() -> anyhow::Result<()> {
    let json = r#"{"decisions": [{"id": "t", "table": {
        "inputs": ["age", "member"],
        "rules": [{"id": "r", "input_entries": [18, true], "then": {"decision": "x"}}]
    }}]}"#;
    let graph = DecisionGraphParser::parse(json)?;
    match &graph.decisions[0].logic {
        DecisionLogic::Table(table) => {
            assert_eq!(table.rules[0].input_entries[0].source, "18");
            assert_eq!(table.rules[0].input_entries[1].source, "true");
        }
        other => panic!("Expected table, got {:?}", other),
    }
    Ok(())
}
