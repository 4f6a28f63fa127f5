//! Collection operators; both operands must be lists

use super::basic::contains;
use crate::condition::Dispatch;
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["contains_all", "contains_any", "intersects", "subset_of"];

pub(crate) fn evaluate(op: &str, actual: &FeelValue, expected: &FeelValue) -> Dispatch {
    if !OPERATORS.contains(&op) {
        return Dispatch::NotMine;
    }
    let (Some(left), Some(right)) = (actual.as_list(), expected.as_list()) else {
        return Dispatch::Handled(false);
    };
    let result = match op {
        "contains_all" => right.iter().all(|item| contains(left, item)),
        "subset_of" => left.iter().all(|item| contains(right, item)),
        // contains_any, intersects
        _ => right.iter().any(|item| contains(left, item)),
    };
    Dispatch::Handled(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(op: &str, actual: serde_json::Value, expected: serde_json::Value) -> bool {
        evaluate(op, &FeelValue::from_json(&actual), &FeelValue::from_json(&expected))
            == Dispatch::Handled(true)
    }

    #[test]
    fn test_set_relations() {
        assert!(check("contains_all", json!(["a", "b", "c"]), json!(["a", "c"])));
        assert!(!check("contains_all", json!(["a"]), json!(["a", "c"])));
        assert!(check("contains_any", json!([1, 2]), json!([2, 3])));
        assert!(!check("intersects", json!([1, 2]), json!([3, 4])));
        assert!(check("subset_of", json!(["x"]), json!(["x", "y"])));
        assert!(check("subset_of", json!([]), json!(["x"])));
    }

    #[test]
    fn test_non_lists_are_false() {
        assert!(!check("contains_all", json!("abc"), json!(["a"])));
        assert!(!check("contains_any", json!(["a"]), json!("a")));
    }
}
