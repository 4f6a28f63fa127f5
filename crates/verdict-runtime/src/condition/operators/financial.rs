//! Financial operators
//!
//! The actual value is the principal (or future amount for `present_value`).
//! Parameters come from the expected map alongside `compare` and `value`.

use super::{compare_result, number, param};
use crate::condition::Dispatch;
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["compound_interest", "present_value", "future_value", "payment"];

pub(crate) fn evaluate(op: &str, actual: &FeelValue, expected: &FeelValue) -> Dispatch {
    if !OPERATORS.contains(&op) {
        return Dispatch::NotMine;
    }
    if expected.as_context().is_none() {
        tracing::warn!("Operator '{}' requires a parameter map, got {}", op, expected);
        return Dispatch::Handled(false);
    }
    let result = number(actual).and_then(|amount| compute(op, amount, expected));
    Dispatch::Handled(result.map_or(false, |value| compare_result(value, expected)))
}

fn compute(op: &str, amount: f64, params: &FeelValue) -> Option<f64> {
    let rate = param(params, "rate")?;
    match op {
        "compound_interest" => {
            let per_year = param(params, "times_per_year").unwrap_or(1.0);
            let years = param(params, "years")?;
            if per_year <= 0.0 {
                return None;
            }
            Some(amount * (1.0 + rate / per_year).powf(per_year * years))
        }
        "future_value" => Some(amount * (1.0 + rate).powf(periods(params)?)),
        "present_value" => Some(amount / (1.0 + rate).powf(periods(params)?)),
        _ => {
            let n = periods(params)?;
            if n <= 0.0 {
                return None;
            }
            if rate == 0.0 {
                return Some(amount / n);
            }
            Some(amount * rate / (1.0 - (1.0 + rate).powf(-n)))
        }
    }
}

fn periods(params: &FeelValue) -> Option<f64> {
    param(params, "periods").or_else(|| param(params, "years"))
}
