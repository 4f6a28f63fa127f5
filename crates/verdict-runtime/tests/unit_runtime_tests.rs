//! Unit tests for verdict-runtime
//!
//! Covers the public surface end to end: contexts, FEEL evaluation, the rule
//! engine and the evaluator trait.

use serde_json::json;
use verdict_core::ast::Ruleset;
use verdict_core::{FeelContext, FeelNumber, FeelValue};
use verdict_parser::RulesetParser;
use verdict_runtime::error::RuntimeError;
use verdict_runtime::{Context, Evaluator, FeelEvaluator, RuleEngine, BUILTIN_FUNCTIONS};

fn eval(source: &str, context: &Context) -> FeelValue {
    FeelEvaluator::evaluate_str(source, context).unwrap()
}

// ========== Context Tests ==========

#[test]
fn test_context_from_json_copies_input() {
    let mut input = json!({"user": {"name": "ada", "score": 7}});
    let ctx = Context::from_json(&input).unwrap();
    input["user"]["name"] = json!("changed");

    assert_eq!(ctx.lookup("user.name"), FeelValue::from("ada"));
    assert_eq!(ctx.to_json()["user"]["score"], json!(7));
}

#[test]
fn test_context_rejects_non_objects() {
    assert!(matches!(
        Context::from_json(&json!([1, 2])),
        Err(RuntimeError::InvalidContext(_))
    ));
    assert!(Context::from_json(&json!(null)).unwrap().is_empty());
}

#[test]
fn test_context_binding_leaves_original_untouched() {
    let base = Context::from_pairs([("a", FeelValue::from(1_i64))]);
    let extended = base.with_binding("b", FeelValue::from(2_i64));

    assert_eq!(base.len(), 1);
    assert_eq!(extended.len(), 2);
    assert!(base.get("b").is_none());
}

#[test]
fn test_missing_path_is_null() {
    let ctx = Context::from_json(&json!({"a": {"b": 1}})).unwrap();
    assert!(ctx.lookup("a.c").is_null());
    assert!(ctx.lookup("a.b.c").is_null());
    assert!(ctx.lookup("z").is_null());
}

// ========== FEEL Evaluation Tests ==========

#[test]
fn test_printed_literals_evaluate_to_themselves() -> anyhow::Result<()> {
    let mut nested = FeelContext::new();
    nested.insert("first name".to_string(), FeelValue::from("Ada \"the\" analyst"));
    nested.insert("limits".to_string(), FeelValue::list(vec![FeelValue::from(1_i64), FeelValue::Null]));

    let mut outer = FeelContext::new();
    outer.insert("applicant".to_string(), FeelValue::context(nested));
    outer.insert("a.b".to_string(), FeelValue::Boolean(false));
    outer.insert("empty".to_string(), FeelValue::context(FeelContext::new()));

    let values = vec![
        FeelValue::Null,
        FeelValue::Boolean(true),
        FeelValue::Boolean(false),
        FeelValue::from(0_i64),
        FeelValue::from(-42_i64),
        FeelValue::Number(FeelNumber::parse_literal("1.50")?),
        FeelValue::Number(FeelNumber::parse_literal("1.50")?.neg()),
        FeelValue::from_f64(0.1 + 0.2),
        FeelValue::from_f64(1e300),
        FeelValue::from_f64(-1e300),
        FeelValue::from_json(&json!(1e300)),
        FeelValue::from_json(&json!(12345678901234567000000000000000.0)),
        FeelValue::from(""),
        FeelValue::from("line\nbreak\ttab \\ slash \"quote\" \u{e9}"),
        FeelValue::list(vec![]),
        FeelValue::list(vec![
            FeelValue::from(1_i64),
            FeelValue::list(vec![FeelValue::from("x"), FeelValue::list(vec![])]),
            FeelValue::Null,
        ]),
        FeelValue::context(outer),
    ];

    let empty = Context::empty();
    for value in values {
        let printed = value.to_string();
        let back = FeelEvaluator::evaluate_str(&printed, &empty)?;
        assert_eq!(back, value, "round trip of {}", printed);
    }
    Ok(())
}

#[test]
fn test_feel_against_context() {
    let ctx = Context::from_json(&json!({
        "applicant": {"age": 42, "income": 5000, "debts": [200, 300]},
        "region": "EU"
    }))
    .unwrap();

    assert_eq!(eval("applicant.age between 18 and 65", &ctx), FeelValue::from(true));
    assert_eq!(eval("sum(applicant.debts) / applicant.income", &ctx), FeelValue::from_f64(0.1));
    assert_eq!(eval("region in [\"EU\", \"UK\"]", &ctx), FeelValue::from(true));
    assert_eq!(
        eval("if applicant.age > 40 then \"senior\" else \"junior\"", &ctx),
        FeelValue::from("senior")
    );
}

#[test]
fn test_feel_quantifiers_and_for() {
    let ctx = Context::from_json(&json!({"xs": [1, 2, 3]})).unwrap();
    assert_eq!(eval("some x in xs satisfies x > 2", &ctx), FeelValue::from(true));
    assert_eq!(eval("every x in xs satisfies x > 2", &ctx), FeelValue::from(false));
    assert_eq!(
        eval("for x in xs return x * 10", &ctx),
        FeelValue::list(vec![
            FeelValue::from(10_i64),
            FeelValue::from(20_i64),
            FeelValue::from(30_i64)
        ])
    );
}

#[test]
fn test_feel_unknown_function() {
    let err = FeelEvaluator::evaluate_str("frobnicate(1)", &Context::empty()).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownFunction(name) if name == "frobnicate"));
}

#[test]
fn test_feel_parse_error_surfaces() {
    let err = FeelEvaluator::evaluate_str("1 +", &Context::empty()).unwrap_err();
    assert!(matches!(err, RuntimeError::Feel(_)));
}

#[test]
fn test_builtin_catalog_lists_minimum_set() {
    for name in ["length", "substring", "upper", "lower", "sum", "mean", "min", "max"] {
        assert!(BUILTIN_FUNCTIONS.contains(&name), "{} missing", name);
    }
}

// ========== Rule Engine Tests ==========

fn fraud_ruleset() -> Ruleset {
    RulesetParser::parse(
        r#"{
            "version": "2.1",
            "ruleset": "fraud",
            "rules": [
                {"id": "blocked_country",
                 "if": {"field": "txn.country", "op": "in", "value": ["KP", "IR"]},
                 "then": {"decision": "deny", "weight": 1.0, "reason": "sanctioned"}},
                {"id": "large_new_account",
                 "if": {"all": [
                    {"field": "txn.amount", "op": "gt", "value": 5000},
                    {"field": "account.age_days", "op": "lt", "value": 30}
                 ]},
                 "then": {"decision": "review", "weight": 0.7, "reason": "large amount on new account"}},
                {"id": "default",
                 "if": {"all": []},
                 "then": {"decision": "approve", "weight": 0.4}}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_rule_engine_first_match_and_metadata() {
    let engine = RuleEngine::new(fraud_ruleset());
    let ctx = Context::from_json(&json!({
        "txn": {"country": "US", "amount": 9000},
        "account": {"age_days": 3}
    }))
    .unwrap();

    let evaluation = engine.evaluate(&ctx).unwrap();
    assert_eq!(evaluation.decision(), "review");
    assert_eq!(evaluation.weight(), 0.7);
    assert_eq!(evaluation.rule_id(), Some("large_new_account"));
    assert_eq!(evaluation.metadata()["ruleset"], json!("fraud"));
    assert_eq!(evaluation.metadata()["version"], json!("2.1"));

    let trace = evaluation.trace().unwrap();
    let rules = trace["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["matched"], json!(false));
    assert_eq!(rules[1]["decision"], json!("review"));
}

#[test]
fn test_rule_engine_type_mismatch_fails_closed() {
    let engine = RuleEngine::new(fraud_ruleset());
    let ctx = Context::from_json(&json!({
        "txn": {"country": 7, "amount": "lots"},
        "account": {"age_days": 3}
    }))
    .unwrap();

    let evaluation = engine.evaluate(&ctx).unwrap();
    assert_eq!(evaluation.rule_id(), Some("default"));
}

#[test]
fn test_rule_engine_as_evaluator() {
    let engine = RuleEngine::new(fraud_ruleset());
    let evaluator: &dyn Evaluator = &engine;
    let ctx = Context::from_json(&json!({"txn": {"country": "KP"}})).unwrap();

    assert_eq!(evaluator.name(), "fraud");
    let evaluation = evaluator.evaluate(&ctx).unwrap().unwrap();
    assert_eq!(evaluation.decision(), "deny");
    assert_eq!(evaluation.evaluator_name(), "fraud");
}
