//! Date arithmetic operators

use super::datetime::{now, to_datetime};
use super::number;
use crate::condition::{ConditionCaches, Dispatch};
use chrono::{Duration, Months, NaiveDateTime};
use verdict_core::{FeelDuration, FeelValue};

pub(crate) const OPERATORS: &[&str] = &["date_add", "date_subtract", "elapsed_within", "elapsed_exceeds"];

pub(crate) fn evaluate(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Dispatch {
    let result = match op {
        "date_add" => shifted_compare(actual, expected, 1, caches),
        "date_subtract" => shifted_compare(actual, expected, -1, caches),
        "elapsed_within" => elapsed(actual, expected, caches).map(|(elapsed, bound)| (0.0..=bound).contains(&elapsed)),
        "elapsed_exceeds" => elapsed(actual, expected, caches).map(|(elapsed, bound)| elapsed > bound),
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result.unwrap_or(false))
}

/// `{"amount": n, "unit": "days", "compare": "before", "target": <date>}`
fn shifted_compare(
    actual: &FeelValue,
    expected: &FeelValue,
    sign: i64,
    caches: &ConditionCaches,
) -> Option<bool> {
    let start = to_datetime(actual, caches)?;
    let amount = number(expected.get("amount")?)? as i64 * sign;
    let unit = expected.get("unit").and_then(FeelValue::as_str).unwrap_or("days");
    let shifted = shift(start, amount, unit)?;
    let target = match expected.get("target") {
        Some(value) => to_datetime(value, caches)?,
        None => now(),
    };
    let compare = expected.get("compare").and_then(FeelValue::as_str).unwrap_or("before");
    match compare {
        "before" => Some(shifted < target),
        "after" => Some(shifted > target),
        "on" => Some(shifted.date() == target.date()),
        "on_or_before" => Some(shifted <= target),
        "on_or_after" => Some(shifted >= target),
        other => {
            tracing::warn!("Unknown date comparison '{}'", other);
            None
        }
    }
}

fn shift(start: NaiveDateTime, amount: i64, unit: &str) -> Option<NaiveDateTime> {
    let months = |n: i64| {
        let span = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
        if n >= 0 {
            start.checked_add_months(span)
        } else {
            start.checked_sub_months(span)
        }
    };
    match unit.trim_end_matches('s') {
        "year" => months(amount.checked_mul(12)?),
        "month" => months(amount),
        "week" => start.checked_add_signed(Duration::try_weeks(amount)?),
        "day" => start.checked_add_signed(Duration::try_days(amount)?),
        "hour" => start.checked_add_signed(Duration::try_hours(amount)?),
        "minute" => start.checked_add_signed(Duration::try_minutes(amount)?),
        "second" => start.checked_add_signed(Duration::try_seconds(amount)?),
        other => {
            tracing::warn!("Unknown date unit '{}'", other);
            None
        }
    }
}

/// Seconds elapsed since `actual` and the allowed bound, in seconds.
///
/// `expected` is an ISO duration string or `{"duration": "P30D", "reference": <date>}`.
fn elapsed(actual: &FeelValue, expected: &FeelValue, caches: &ConditionCaches) -> Option<(f64, f64)> {
    let moment = to_datetime(actual, caches)?;
    let (duration, reference) = match expected {
        FeelValue::Duration(d) => (*d, now()),
        FeelValue::String(raw) => (FeelDuration::parse(raw).ok()?, now()),
        FeelValue::Context(params) => {
            let duration = match params.get("duration")? {
                FeelValue::Duration(d) => *d,
                FeelValue::String(raw) => FeelDuration::parse(raw).ok()?,
                _ => return None,
            };
            let reference = match params.get("reference") {
                Some(value) => to_datetime(value, caches)?,
                None => now(),
            };
            (duration, reference)
        }
        _ => return None,
    };
    let seconds = (reference - moment).num_milliseconds() as f64 / 1000.0;
    Some((seconds, duration.to_seconds()))
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
    fn test_date_add_compare() {
        let expected = json!({"amount": 30, "unit": "days", "compare": "before", "target": "2024-03-01"});
        assert!(check("date_add", json!("2024-01-15"), expected.clone()));
        assert!(!check("date_add", json!("2024-02-15"), expected));
        let on = json!({"amount": 1, "unit": "month", "compare": "on", "target": "2024-02-29"});
        assert!(check("date_add", json!("2024-01-31"), on));
    }

    #[test]
    fn test_date_subtract() {
        let expected = json!({"amount": 1, "unit": "years", "compare": "on", "target": "2023-06-01"});
        assert!(check("date_subtract", json!("2024-06-01"), expected));
        let weeks = json!({"amount": 2, "unit": "weeks", "compare": "after", "target": "2024-05-01"});
        assert!(check("date_subtract", json!("2024-06-01"), weeks));
    }

    #[test]
    fn test_elapsed() {
        let window = json!({"duration": "P30D", "reference": "2024-02-01"});
        assert!(check("elapsed_within", json!("2024-01-15"), window.clone()));
        assert!(!check("elapsed_exceeds", json!("2024-01-15"), window.clone()));
        assert!(check("elapsed_exceeds", json!("2023-12-01"), window.clone()));
        assert!(!check("elapsed_within", json!("2024-03-01"), window));
        assert!(check("elapsed_exceeds", json!("2000-01-01"), json!("P1Y")));
    }

    #[test]
    fn test_malformed_parameters_are_false() {
        assert!(!check("date_add", json!("2024-01-15"), json!({"unit": "days"})));
        assert!(!check("date_add", json!("2024-01-15"), json!({"amount": 1, "unit": "fortnight"})));
        assert!(!check("elapsed_within", json!("2024-01-15"), json!("thirty days")));
    }
}
