//! String operators

use super::basic;
use crate::condition::{ConditionCaches, Dispatch};
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["contains", "starts_with", "ends_with", "matches"];

pub(crate) fn evaluate(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Dispatch {
    let result = match op {
        "contains" => match (actual, expected) {
            (FeelValue::String(haystack), FeelValue::String(needle)) => haystack.contains(needle.as_str()),
            (FeelValue::List(items), needle) => basic::contains(items, needle),
            _ => false,
        },
        "starts_with" => both_strings(actual, expected).map_or(false, |(s, p)| s.starts_with(p)),
        "ends_with" => both_strings(actual, expected).map_or(false, |(s, p)| s.ends_with(p)),
        "matches" => match both_strings(actual, expected) {
            Some((text, pattern)) => caches
                .regex(pattern)
                .map_or(false, |regex| regex.is_match(text)),
            None => false,
        },
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result)
}

fn both_strings<'a>(actual: &'a FeelValue, expected: &'a FeelValue) -> Option<(&'a str, &'a str)> {
    Some((actual.as_str()?, expected.as_str()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(op: &str, actual: FeelValue, expected: FeelValue) -> bool {
        let caches = ConditionCaches::new();
        evaluate(op, &actual, &expected, &caches) == Dispatch::Handled(true)
    }

    #[test]
    fn test_substring_operators() {
        assert!(check("contains", "premium plan".into(), "plan".into()));
        assert!(check("starts_with", "ORD-123".into(), "ORD-".into()));
        assert!(check("ends_with", "user@corp.com".into(), "@corp.com".into()));
        assert!(!check("contains", FeelValue::from(12_i64), "1".into()));
    }

    #[test]
    fn test_contains_on_list() {
        let tags = FeelValue::list(vec!["vip".into(), "beta".into()]);
        assert!(check("contains", tags.clone(), "beta".into()));
        assert!(!check("contains", tags, "alpha".into()));
    }

    #[test]
    fn test_matches_uses_regex() {
        assert!(check("matches", "ab-1234".into(), r"^[a-z]{2}-\d{4}$".into()));
        assert!(!check("matches", "ab-12".into(), r"^[a-z]{2}-\d{4}$".into()));
        assert!(!check("matches", "anything".into(), "(".into()));
    }
}
