//! Numeric range operators

use super::{approx_eq, number};
use crate::condition::{ConditionCaches, Dispatch};
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["between", "modulo"];

pub(crate) fn evaluate(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Dispatch {
    let keys = match op {
        "between" => ("min", "max"),
        "modulo" => ("divisor", "remainder"),
        _ => return Dispatch::NotMine,
    };
    let Some(value) = number(actual) else {
        return Dispatch::Handled(false);
    };
    let Some((first, second)) = pair(op, expected, keys, caches) else {
        tracing::debug!("Operator '{}' given malformed parameters: {}", op, expected);
        return Dispatch::Handled(false);
    };
    let result = match op {
        "between" => first <= value && value <= second,
        _ => first != 0.0 && approx_eq(value.rem_euclid(first), second),
    };
    Dispatch::Handled(result)
}

/// Two numeric parameters from `[a, b]` or `{<k1>: a, <k2>: b}`.
///
/// Both forms reduce to the same `op:a,b` key before the cache lookup.
fn pair(
    op: &str,
    expected: &FeelValue,
    (k1, k2): (&str, &str),
    caches: &ConditionCaches,
) -> Option<(f64, f64)> {
    let (a, b) = match expected {
        FeelValue::List(items) if items.len() == 2 => (&items[0], &items[1]),
        FeelValue::Context(map) => (map.get(k1)?, map.get(k2)?),
        _ => return None,
    };
    let key = format!("{}:{},{}", op, a, b);
    caches
        .params
        .get_or_insert_with(key.as_str(), || Some((number(a)?, number(b)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(op: &str, actual: serde_json::Value, expected: serde_json::Value) -> bool {
        let caches = ConditionCaches::new();
        evaluate(
            op,
            &FeelValue::from_json(&actual),
            &FeelValue::from_json(&expected),
            &caches,
        ) == Dispatch::Handled(true)
    }

    #[test]
    fn test_between_is_inclusive() {
        assert!(check("between", json!(18), json!([18, 65])));
        assert!(check("between", json!(65), json!({"min": 18, "max": 65})));
        assert!(!check("between", json!(66), json!([18, 65])));
        assert!(!check("between", json!("30"), json!([18, 65])));
        assert!(!check("between", json!(30), json!([18])));
    }

    #[test]
    fn test_modulo() {
        assert!(check("modulo", json!(10), json!([5, 0])));
        assert!(check("modulo", json!(7), json!({"divisor": 3, "remainder": 1})));
        assert!(check("modulo", json!(-7), json!([3, 2])));
        assert!(!check("modulo", json!(7), json!([0, 0])));
    }

    #[test]
    fn test_parameters_memoized() {
        let caches = ConditionCaches::new();
        let expected = FeelValue::from_json(&json!([1, 10]));
        for n in 0..5_i64 {
            evaluate("between", &FeelValue::from(n), &expected, &caches);
        }
        assert_eq!(caches.stats().params, 1);
        let keyed = FeelValue::from_json(&json!({"min": 1, "max": 10}));
        evaluate("between", &FeelValue::from(3_i64), &keyed, &caches);
        assert_eq!(caches.stats().params, 1);
    }
}
