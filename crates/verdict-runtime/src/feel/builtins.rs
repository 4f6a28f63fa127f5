//! Built-in FEEL functions
//!
//! Arguments arrive already evaluated. Functions return null when handed
//! values of the wrong type and an error when called with the wrong number
//! of arguments.

use crate::error::{Result, RuntimeError};
use chrono::NaiveDate;
use rust_decimal::RoundingStrategy;
use std::cmp::Ordering;
use verdict_core::{CoreError, FeelDate, FeelDuration, FeelNumber, FeelTime, FeelValue};

/// Names of every built-in function
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "length", "substring", "upper", "lower", "upper_case", "lower_case", "sum", "mean", "min",
    "max", "count", "abs", "floor", "ceiling", "round", "sqrt", "contains", "starts_with",
    "ends_with", "string", "number", "date", "time", "duration", "not", "append", "reverse",
    "distinct", "is_null",
];

pub(crate) fn call(name: &str, args: &[FeelValue]) -> Result<FeelValue> {
    match name {
        "length" => {
            arity(name, args, 1, 1)?;
            Ok(match &args[0] {
                FeelValue::String(s) => int(s.chars().count()),
                FeelValue::List(items) => int(items.len()),
                _ => FeelValue::Null,
            })
        }
        "substring" => {
            arity(name, args, 2, 3)?;
            Ok(substring(&args[0], &args[1], args.get(2)))
        }
        "upper" | "upper_case" => {
            arity(name, args, 1, 1)?;
            Ok(map_string(&args[0], |s| s.to_uppercase()))
        }
        "lower" | "lower_case" => {
            arity(name, args, 1, 1)?;
            Ok(map_string(&args[0], |s| s.to_lowercase()))
        }
        "sum" => Ok(numbers(collection(args)).map_or(FeelValue::Null, |ns| sum(&ns))),
        "mean" => Ok(numbers(collection(args)).map_or(FeelValue::Null, |ns| mean(&ns))),
        "min" => Ok(extreme(collection(args), Ordering::Less)),
        "max" => Ok(extreme(collection(args), Ordering::Greater)),
        "count" => {
            arity(name, args, 1, 1)?;
            Ok(args[0].as_list().map_or(FeelValue::Null, |items| int(items.len())))
        }
        "abs" => {
            arity(name, args, 1, 1)?;
            Ok(map_number(&args[0], |n| match n {
                FeelNumber::Decimal(d) => Some(FeelNumber::Decimal(d.abs())),
                FeelNumber::Float(f) => FeelNumber::float(f.abs()),
            }))
        }
        "floor" => {
            arity(name, args, 1, 1)?;
            Ok(map_number(&args[0], |n| match n {
                FeelNumber::Decimal(d) => Some(FeelNumber::Decimal(d.floor())),
                FeelNumber::Float(f) => FeelNumber::float(f.floor()),
            }))
        }
        "ceiling" => {
            arity(name, args, 1, 1)?;
            Ok(map_number(&args[0], |n| match n {
                FeelNumber::Decimal(d) => Some(FeelNumber::Decimal(d.ceil())),
                FeelNumber::Float(f) => FeelNumber::float(f.ceil()),
            }))
        }
        "round" => {
            arity(name, args, 1, 2)?;
            round(name, &args[0], args.get(1))
        }
        "sqrt" => {
            arity(name, args, 1, 1)?;
            Ok(match args[0].as_f64() {
                Some(f) if f >= 0.0 => FeelValue::from_f64(f.sqrt()),
                _ => FeelValue::Null,
            })
        }
        "contains" => string_test(name, args, |s, m| s.contains(m)),
        "starts_with" => string_test(name, args, |s, m| s.starts_with(m)),
        "ends_with" => string_test(name, args, |s, m| s.ends_with(m)),
        "string" => {
            arity(name, args, 1, 1)?;
            Ok(match &args[0] {
                FeelValue::Null => FeelValue::Null,
                FeelValue::String(s) => FeelValue::String(s.clone()),
                FeelValue::Date(d) => FeelValue::String(d.to_string()),
                FeelValue::Time(t) => FeelValue::String(t.to_string()),
                FeelValue::Duration(d) => FeelValue::String(d.to_string()),
                other => FeelValue::String(other.to_string()),
            })
        }
        "number" => {
            arity(name, args, 1, 1)?;
            Ok(match &args[0] {
                FeelValue::Number(n) => FeelValue::Number(*n),
                FeelValue::String(s) => FeelNumber::parse_literal(s.trim())
                    .map_or(FeelValue::Null, FeelValue::Number),
                _ => FeelValue::Null,
            })
        }
        "date" => date(name, args),
        "time" => {
            arity(name, args, 1, 1)?;
            match &args[0] {
                FeelValue::String(s) => Ok(FeelValue::Time(FeelTime::parse(s)?)),
                FeelValue::Time(t) => Ok(FeelValue::Time(*t)),
                FeelValue::Null => Ok(FeelValue::Null),
                other => Err(CoreError::type_error(FeelTime::FORMAT, other.type_name(), other.to_string()).into()),
            }
        }
        "duration" => {
            arity(name, args, 1, 1)?;
            match &args[0] {
                FeelValue::String(s) => Ok(FeelValue::Duration(FeelDuration::parse(s)?)),
                FeelValue::Duration(d) => Ok(FeelValue::Duration(*d)),
                FeelValue::Null => Ok(FeelValue::Null),
                other => Err(CoreError::type_error(
                    FeelDuration::FORMAT,
                    other.type_name(),
                    other.to_string(),
                )
                .into()),
            }
        }
        "not" => {
            arity(name, args, 1, 1)?;
            Ok(args[0]
                .as_bool()
                .map_or(FeelValue::Null, |b| FeelValue::Boolean(!b)))
        }
        "append" => {
            if args.is_empty() {
                return Err(RuntimeError::invalid_arguments(name, "expected a list"));
            }
            Ok(match args[0].as_list() {
                Some(items) => {
                    let mut appended = items.to_vec();
                    appended.extend(args[1..].iter().cloned());
                    FeelValue::list(appended)
                }
                None => FeelValue::Null,
            })
        }
        "reverse" => {
            arity(name, args, 1, 1)?;
            Ok(args[0].as_list().map_or(FeelValue::Null, |items| {
                FeelValue::list(items.iter().rev().cloned().collect())
            }))
        }
        "distinct" => {
            arity(name, args, 1, 1)?;
            Ok(args[0].as_list().map_or(FeelValue::Null, |items| {
                let mut unique: Vec<FeelValue> = Vec::with_capacity(items.len());
                for item in items {
                    if !unique.iter().any(|seen| seen.feel_eq(item) == Some(true)) {
                        unique.push(item.clone());
                    }
                }
                FeelValue::list(unique)
            }))
        }
        "is_null" => {
            arity(name, args, 1, 1)?;
            Ok(FeelValue::Boolean(args[0].is_null()))
        }
        _ => Err(RuntimeError::UnknownFunction(name.to_string())),
    }
}

fn arity(name: &str, args: &[FeelValue], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(RuntimeError::invalid_arguments(
            name,
            format!("expected {} arguments, got {}", expected, args.len()),
        ));
    }
    Ok(())
}

fn int(value: usize) -> FeelValue {
    FeelValue::Number(FeelNumber::from_i64(value as i64))
}

/// A single list argument spreads into its items; otherwise the arguments themselves
fn collection(args: &[FeelValue]) -> &[FeelValue] {
    match args {
        [FeelValue::List(items)] => items.as_slice(),
        _ => args,
    }
}

fn numbers(values: &[FeelValue]) -> Option<Vec<FeelNumber>> {
    if values.is_empty() {
        return None;
    }
    values.iter().map(|v| v.as_number().copied()).collect()
}

fn sum(numbers: &[FeelNumber]) -> FeelValue {
    numbers
        .iter()
        .try_fold(FeelNumber::from_i64(0), |acc, n| acc.add(n))
        .map_or(FeelValue::Null, FeelValue::Number)
}

fn mean(numbers: &[FeelNumber]) -> FeelValue {
    match sum(numbers) {
        FeelValue::Number(total) => total
            .div(&FeelNumber::from_i64(numbers.len() as i64))
            .map_or(FeelValue::Null, FeelValue::Number),
        other => other,
    }
}

/// Smallest (`Less`) or largest (`Greater`) value; null if any pair is incomparable
fn extreme(values: &[FeelValue], wanted: Ordering) -> FeelValue {
    let mut best: Option<&FeelValue> = None;
    for value in values {
        best = match best {
            None => Some(value),
            Some(current) => match value.feel_cmp(current) {
                Some(ordering) if ordering == wanted => Some(value),
                Some(_) => Some(current),
                None => return FeelValue::Null,
            },
        };
    }
    best.cloned().unwrap_or(FeelValue::Null)
}

fn map_string(value: &FeelValue, f: impl Fn(&str) -> String) -> FeelValue {
    value
        .as_str()
        .map_or(FeelValue::Null, |s| FeelValue::String(f(s)))
}

fn map_number(value: &FeelValue, f: impl Fn(&FeelNumber) -> Option<FeelNumber>) -> FeelValue {
    value
        .as_number()
        .and_then(f)
        .map_or(FeelValue::Null, FeelValue::Number)
}

fn string_test(name: &str, args: &[FeelValue], test: impl Fn(&str, &str) -> bool) -> Result<FeelValue> {
    arity(name, args, 2, 2)?;
    Ok(match (args[0].as_str(), args[1].as_str()) {
        (Some(s), Some(m)) => FeelValue::Boolean(test(s, m)),
        _ => FeelValue::Null,
    })
}

/// 1-based start, negative counts from the end
fn substring(value: &FeelValue, start: &FeelValue, length: Option<&FeelValue>) -> FeelValue {
    let (Some(s), Some(start)) = (value.as_str(), start.as_number().and_then(|n| n.to_i64())) else {
        return FeelValue::Null;
    };
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let begin = match start {
        0 => return FeelValue::Null,
        s if s > 0 => s - 1,
        s => len + s,
    }
    .clamp(0, len);
    let end = match length {
        None => len,
        Some(l) => match l.as_number().and_then(|n| n.to_i64()) {
            Some(l) if l >= 0 => (begin + l).min(len),
            _ => return FeelValue::Null,
        },
    };
    FeelValue::String(chars[begin as usize..end as usize].iter().collect())
}

fn round(name: &str, value: &FeelValue, scale: Option<&FeelValue>) -> Result<FeelValue> {
    let scale = match scale {
        None => 0,
        Some(s) => match s.as_number().and_then(|n| n.to_i64()) {
            Some(s) if (0..=28).contains(&s) => s as u32,
            _ => {
                return Err(RuntimeError::invalid_arguments(
                    name,
                    format!("scale must be an integer in 0..=28, got {}", s),
                ))
            }
        },
    };
    Ok(map_number(value, |n| match n {
        FeelNumber::Decimal(d) => Some(FeelNumber::Decimal(
            d.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        )),
        FeelNumber::Float(f) => {
            let factor = 10f64.powi(scale as i32);
            FeelNumber::float((f * factor).round() / factor)
        }
    }))
}

fn date(name: &str, args: &[FeelValue]) -> Result<FeelValue> {
    match args {
        [FeelValue::String(s)] => Ok(FeelValue::Date(FeelDate::parse(s)?)),
        [FeelValue::Date(d)] => Ok(FeelValue::Date(*d)),
        [FeelValue::Null] => Ok(FeelValue::Null),
        [year, month, day] => {
            let part = |v: &FeelValue| v.as_number().and_then(|n| n.to_i64());
            let parsed = match (part(year), part(month), part(day)) {
                (Some(y), Some(m), Some(d)) => i32::try_from(y).ok().and_then(|y| {
                    NaiveDate::from_ymd_opt(y, u32::try_from(m).ok()?, u32::try_from(d).ok()?)
                }),
                _ => None,
            };
            parsed.map(|d| FeelValue::Date(FeelDate::from_naive(d))).ok_or_else(|| {
                CoreError::type_error(
                    FeelDate::FORMAT,
                    "numbers",
                    format!("{}, {}, {}", year, month, day),
                )
                .into()
            })
        }
        [other] => Err(CoreError::type_error(FeelDate::FORMAT, other.type_name(), other.to_string()).into()),
        _ => Err(RuntimeError::invalid_arguments(
            name,
            format!("expected 1 or 3 arguments, got {}", args.len()),
        )),
    }
}
