//! Mathematical operators
//!
//! The operator computes a number from the actual value and compares it with
//! the expected side through [`compare_result`](super::compare_result).

use super::{compare_result, number, param};
use crate::condition::Dispatch;
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &[
    "sin", "cos", "tan", "power", "sqrt", "abs", "round", "floor", "ceil", "factorial", "gcd",
    "lcm", "min", "max", "sum", "average", "median", "count", "percentile",
];

/// Largest n whose factorial fits in an f64
const MAX_FACTORIAL: f64 = 170.0;

pub(crate) fn evaluate(op: &str, actual: &FeelValue, expected: &FeelValue) -> Dispatch {
    let result = match op {
        "sin" => number(actual).map(f64::sin),
        "cos" => number(actual).map(f64::cos),
        "tan" => number(actual).map(f64::tan),
        "power" => {
            let exponent = param(expected, "exponent").unwrap_or(2.0);
            number(actual).map(|x| x.powf(exponent))
        }
        "sqrt" => number(actual).filter(|x| *x >= 0.0).map(f64::sqrt),
        "abs" => number(actual).map(f64::abs),
        "round" => {
            let digits = param(expected, "digits").unwrap_or(0.0) as i32;
            number(actual).map(|x| round_to(x, digits))
        }
        "floor" => number(actual).map(f64::floor),
        "ceil" => number(actual).map(f64::ceil),
        "factorial" => number(actual).and_then(factorial),
        "gcd" => magnitudes(actual, expected).and_then(|ns| ns.into_iter().reduce(gcd)).map(|n| n as f64),
        "lcm" => magnitudes(actual, expected)
            .and_then(|ns| {
                let mut ns = ns.into_iter();
                let first = ns.next()?;
                ns.try_fold(first, lcm)
            })
            .map(|n| n as f64),
        "min" | "max" | "sum" | "average" | "median" | "count" | "percentile" => {
            aggregate(op, actual, expected)
        }
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result.map_or(false, |value| compare_result(value, expected)))
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 || n > MAX_FACTORIAL {
        return None;
    }
    Some((1..=n as u32).fold(1.0, |acc, k| acc * k as f64))
}

fn as_integer(value: &FeelValue) -> Option<i64> {
    let n = number(value)?;
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

/// Integer operands from a list actual, or the actual plus a `with` parameter
fn integers(actual: &FeelValue, expected: &FeelValue) -> Option<Vec<i64>> {
    let mut values = match actual {
        FeelValue::List(items) => items.iter().map(as_integer).collect::<Option<Vec<_>>>()?,
        other => vec![as_integer(other)?],
    };
    match expected.get("with") {
        Some(FeelValue::List(items)) => {
            for item in items.iter() {
                values.push(as_integer(item)?);
            }
        }
        Some(other) => values.push(as_integer(other)?),
        None => {}
    }
    (values.len() >= 2).then_some(values)
}

/// Absolute values of the integer operands; `i64::MIN` has no `i64` magnitude
fn magnitudes(actual: &FeelValue, expected: &FeelValue) -> Option<Vec<u64>> {
    integers(actual, expected).map(|ns| ns.into_iter().map(i64::unsigned_abs).collect())
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `None` when the multiple overflows
fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

fn aggregate(op: &str, actual: &FeelValue, expected: &FeelValue) -> Option<f64> {
    let items = actual.as_list()?;
    if op == "count" {
        return Some(items.len() as f64);
    }
    let mut values = items.iter().map(number).collect::<Option<Vec<f64>>>()?;
    if op == "sum" {
        return Some(values.iter().sum());
    }
    if values.is_empty() {
        return None;
    }
    match op {
        "min" => values.iter().copied().reduce(f64::min),
        "max" => values.iter().copied().reduce(f64::max),
        "average" => Some(values.iter().sum::<f64>() / values.len() as f64),
        "median" => {
            values.sort_by(f64::total_cmp);
            Some(percentile(&values, 50.0))
        }
        _ => {
            let p = param(expected, "p")?;
            if !(0.0..=100.0).contains(&p) {
                return None;
            }
            values.sort_by(f64::total_cmp);
            Some(percentile(&values, p))
        }
    }
}

/// Linear interpolation between closest ranks of sorted values
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}
