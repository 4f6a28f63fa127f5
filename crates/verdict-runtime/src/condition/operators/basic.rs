//! Basic comparison operators

use crate::condition::Dispatch;
use std::cmp::Ordering;
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &[
    "eq", "neq", "gt", "gte", "lt", "lte", "in", "not_in", "present", "blank",
];

pub(crate) fn evaluate(op: &str, actual: &FeelValue, expected: &FeelValue) -> Dispatch {
    let result = match op {
        "eq" => equals(actual, expected).unwrap_or(false),
        "neq" => equals(actual, expected).map_or(false, |eq| !eq),
        "gt" => ordering(actual, expected).map_or(false, Ordering::is_gt),
        "gte" => ordering(actual, expected).map_or(false, Ordering::is_ge),
        "lt" => ordering(actual, expected).map_or(false, Ordering::is_lt),
        "lte" => ordering(actual, expected).map_or(false, Ordering::is_le),
        "in" => expected.as_list().map_or(false, |items| contains(items, actual)),
        "not_in" => expected.as_list().map_or(false, |items| !contains(items, actual)),
        "present" => expect_flag(expected, !is_blank(actual)),
        "blank" => expect_flag(expected, is_blank(actual)),
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result)
}

/// Equality between values of one concrete type; `None` across types
pub(crate) fn equals(a: &FeelValue, b: &FeelValue) -> Option<bool> {
    if a.type_name() != b.type_name() {
        return None;
    }
    a.feel_eq(b)
}

fn ordering(a: &FeelValue, b: &FeelValue) -> Option<Ordering> {
    if a.type_name() != b.type_name() {
        return None;
    }
    a.feel_cmp(b)
}

pub(crate) fn contains(items: &[FeelValue], value: &FeelValue) -> bool {
    items.iter().any(|item| equals(item, value) == Some(true))
}

fn is_blank(value: &FeelValue) -> bool {
    match value {
        FeelValue::Null => true,
        FeelValue::String(s) => s.trim().is_empty(),
        FeelValue::List(items) => items.is_empty(),
        FeelValue::Context(map) => map.is_empty(),
        _ => false,
    }
}

/// `{"op": "present", "value": false}` inverts the check
fn expect_flag(expected: &FeelValue, observed: bool) -> bool {
    match expected {
        FeelValue::Boolean(wanted) => observed == *wanted,
        _ => observed,
    }
}
