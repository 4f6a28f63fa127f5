//! Date and time operators

use super::number;
use crate::condition::{ConditionCaches, Dispatch};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use verdict_core::FeelValue;

pub(crate) const OPERATORS: &[&str] = &["before_date", "after_date", "within_days", "day_of_week"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

pub(crate) fn evaluate(
    op: &str,
    actual: &FeelValue,
    expected: &FeelValue,
    caches: &ConditionCaches,
) -> Dispatch {
    let result = match op {
        "before_date" => match (to_datetime(actual, caches), to_datetime(expected, caches)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        "after_date" => match (to_datetime(actual, caches), to_datetime(expected, caches)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        "within_days" => within_days(actual, expected, caches).unwrap_or(false),
        "day_of_week" => match to_datetime(actual, caches) {
            Some(moment) => weekday_matches(moment.weekday(), expected),
            None => false,
        },
        _ => return Dispatch::NotMine,
    };
    Dispatch::Handled(result)
}

/// Date-time view of a condition operand; strings are parsed once per cache
pub(crate) fn to_datetime(value: &FeelValue, caches: &ConditionCaches) -> Option<NaiveDateTime> {
    match value {
        FeelValue::Date(date) => Some(date.naive().and_time(NaiveTime::MIN)),
        FeelValue::String(raw) if raw.eq_ignore_ascii_case("now") => Some(now()),
        FeelValue::String(raw) => caches
            .dates
            .get_or_insert_with(raw.as_str(), || parse_datetime(raw)),
        _ => None,
    }
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// ISO-8601 first, then the common alternative layouts
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            tracing::debug!("Unrecognized date '{}'", raw);
            None
        })
}

/// `expected` is a day count, or `{"days": n, "reference": <date>}`
fn within_days(actual: &FeelValue, expected: &FeelValue, caches: &ConditionCaches) -> Option<bool> {
    let moment = to_datetime(actual, caches)?;
    let (days, reference) = match expected {
        FeelValue::Number(n) => (n.to_f64(), now()),
        FeelValue::Context(params) => {
            let days = number(params.get("days")?)?;
            let reference = match params.get("reference") {
                Some(value) => to_datetime(value, caches)?,
                None => now(),
            };
            (days, reference)
        }
        _ => return None,
    };
    let elapsed = (reference - moment).num_seconds().abs() as f64;
    Some(elapsed <= days * 86_400.0)
}

fn weekday_matches(day: Weekday, expected: &FeelValue) -> bool {
    match expected {
        FeelValue::List(items) => items.iter().any(|item| weekday_matches(day, item)),
        FeelValue::Number(n) => n.to_i64() == Some(i64::from(day.number_from_monday())),
        FeelValue::String(name) => name.parse::<Weekday>().map_or(false, |wanted| wanted == day),
        _ => false,
    }
}
