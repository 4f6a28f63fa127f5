//! Operator category handlers
//!
//! Each category module lists the operators it owns and evaluates them,
//! returning [`Dispatch::NotMine`](super::Dispatch::NotMine) for anything
//! else. Type mismatches evaluate to `false`, never to an error.

pub(crate) mod basic;
pub(crate) mod collection;
pub(crate) mod date_arithmetic;
pub(crate) mod datetime;
pub(crate) mod financial;
pub(crate) mod geo;
pub(crate) mod math;
pub(crate) mod numeric;
pub(crate) mod string;

use verdict_core::FeelValue;

/// Absolute tolerance used when a computed result is compared for equality
const EPSILON: f64 = 1e-9;

pub(crate) fn number(value: &FeelValue) -> Option<f64> {
    value.as_number().map(|n| n.to_f64())
}

/// Numeric entry of a parameter map
pub(crate) fn param(expected: &FeelValue, key: &str) -> Option<f64> {
    expected.get(key).and_then(number)
}

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Compare a computed result with the expected side of a predicate.
///
/// `expected` is either a bare number (equality within tolerance) or a map
/// `{"compare": <op>, "value": <number>, ...}` where `compare` defaults to `eq`.
pub(crate) fn compare_result(result: f64, expected: &FeelValue) -> bool {
    if !result.is_finite() {
        return false;
    }
    match expected {
        FeelValue::Number(n) => approx_eq(result, n.to_f64()),
        FeelValue::Context(params) => {
            let op = params.get("compare").and_then(FeelValue::as_str).unwrap_or("eq");
            match params.get("value").and_then(number) {
                Some(target) => compare_numbers(op, result, target),
                None => false,
            }
        }
        _ => false,
    }
}

fn compare_numbers(op: &str, a: f64, b: f64) -> bool {
    match op {
        "eq" => approx_eq(a, b),
        "neq" => !approx_eq(a, b),
        "gt" => a > b && !approx_eq(a, b),
        "gte" => a > b || approx_eq(a, b),
        "lt" => a < b && !approx_eq(a, b),
        "lte" => a < b || approx_eq(a, b),
        other => {
            tracing::warn!("Unknown comparison '{}' in operator parameters", other);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_result_forms() {
        assert!(compare_result(3.0, &FeelValue::from(3_i64)));
        assert!(compare_result(0.1 + 0.2, &FeelValue::from_f64(0.3)));
        let gte = FeelValue::from_json(&json!({"compare": "gte", "value": 10}));
        assert!(compare_result(10.0, &gte));
        assert!(!compare_result(9.5, &gte));
        assert!(!compare_result(f64::NAN, &FeelValue::from(1_i64)));
        assert!(!compare_result(1.0, &FeelValue::from("1")));
    }
}
