//! Arithmetic and comparison over FEEL values
//!
//! Operands of unsupported type combinations yield null rather than an
//! error, following FEEL's null-on-type-mismatch convention.

use chrono::Duration as ChronoDuration;
use std::cmp::Ordering;
use verdict_core::ast::{ArithmeticOp, ComparisonOp};
use verdict_core::{FeelDuration, FeelTime, FeelValue};

pub(crate) fn apply(op: ArithmeticOp, left: &FeelValue, right: &FeelValue) -> FeelValue {
    use ArithmeticOp::*;

    let result = match (left, right) {
        (FeelValue::Number(a), FeelValue::Number(b)) => match op {
            Add => a.add(b),
            Sub => a.sub(b),
            Mul => a.mul(b),
            Div => a.div(b),
            Mod => a.rem(b),
            Pow => a.pow(b),
        }
        .map(FeelValue::Number),

        (FeelValue::String(a), FeelValue::String(b)) if op == Add => {
            Some(FeelValue::String(format!("{}{}", a, b)))
        }

        (FeelValue::Date(a), FeelValue::Date(b)) if op == Sub => {
            Some(FeelValue::Duration(a.since(b)))
        }
        (FeelValue::Date(date), FeelValue::Duration(d)) => match op {
            Add => date.add_duration(d),
            Sub => date.add_duration(&d.negate()),
            _ => None,
        }
        .map(FeelValue::Date),
        (FeelValue::Duration(d), FeelValue::Date(date)) if op == Add => {
            date.add_duration(d).map(FeelValue::Date)
        }

        (FeelValue::Time(time), FeelValue::Duration(d)) => match op {
            Add => Some(shift_time(time, d.to_seconds())),
            Sub => Some(shift_time(time, -d.to_seconds())),
            _ => None,
        },
        (FeelValue::Time(a), FeelValue::Time(b)) if op == Sub => {
            let elapsed = a.naive().signed_duration_since(b.naive());
            Some(FeelValue::Duration(FeelDuration::from_seconds(
                elapsed.num_milliseconds() as f64 / 1000.0,
            )))
        }

        (FeelValue::Duration(a), FeelValue::Duration(b)) => match op {
            Add => Some(FeelValue::Duration(a.add(b))),
            Sub => Some(FeelValue::Duration(a.add(&b.negate()))),
            Div if b.to_seconds() != 0.0 => {
                Some(FeelValue::from_f64(a.to_seconds() / b.to_seconds()))
            }
            _ => None,
        },
        (FeelValue::Duration(d), FeelValue::Number(n)) => match op {
            Mul => Some(FeelValue::Duration(d.scale(n.to_f64()))),
            Div if !n.is_zero() => Some(FeelValue::Duration(d.scale(1.0 / n.to_f64()))),
            _ => None,
        },
        (FeelValue::Number(n), FeelValue::Duration(d)) if op == Mul => {
            Some(FeelValue::Duration(d.scale(n.to_f64())))
        }

        _ => None,
    };

    result.unwrap_or_else(|| {
        if !left.is_null() && !right.is_null() {
            tracing::debug!(
                "{} {} {} is undefined, yielding null",
                left.type_name(),
                op.symbol(),
                right.type_name()
            );
        }
        FeelValue::Null
    })
}

fn shift_time(time: &FeelTime, seconds: f64) -> FeelValue {
    let delta = ChronoDuration::milliseconds((seconds * 1000.0).round() as i64);
    let (shifted, _) = time.naive().overflowing_add_signed(delta);
    FeelValue::Time(FeelTime::from_naive(shifted))
}

/// `=` and `!=` are false for incomparable operands; ordering operators yield null
pub(crate) fn compare(op: ComparisonOp, left: &FeelValue, right: &FeelValue) -> FeelValue {
    match op {
        ComparisonOp::Eq => FeelValue::Boolean(left.feel_eq(right).unwrap_or(false)),
        ComparisonOp::Ne => FeelValue::Boolean(left.feel_eq(right).map_or(false, |eq| !eq)),
        _ => match left.feel_cmp(right) {
            Some(ordering) => FeelValue::Boolean(ordering_holds(op, ordering)),
            None => FeelValue::Null,
        },
    }
}

pub(crate) fn ordering_holds(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::Ne => ordering != Ordering::Equal,
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::Le => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::Ge => ordering != Ordering::Less,
    }
}
