//! FEEL date, time and duration values

use crate::error::{CoreError, Result};
use chrono::{Datelike, Duration as ChronoDuration, Months, NaiveDate, NaiveTime, Timelike};
use std::cmp::Ordering;
use std::fmt;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calendar date (ISO-8601 `YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeelDate(NaiveDate);

impl FeelDate {
    pub const FORMAT: &'static str = "date (YYYY-MM-DD)";

    pub fn parse(raw: &str) -> Result<Self> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(FeelDate)
            .map_err(|_| CoreError::type_error(Self::FORMAT, "string", raw))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        FeelDate(date)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// ISO weekday, Monday = 1 .. Sunday = 7
    pub fn weekday(&self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    /// Shift by a duration; calendar years and months are applied before days
    pub fn add_duration(&self, duration: &FeelDuration) -> Option<Self> {
        let months = duration.years * 12 + duration.months;
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(u32::try_from(months).ok()?))?
        } else {
            self.0
                .checked_sub_months(Months::new(u32::try_from(-months).ok()?))?
        };
        let clock = duration.hours * 3600 + duration.minutes * 60;
        let whole_days = duration.days + ((clock as f64 + duration.seconds) / SECONDS_PER_DAY).trunc() as i64;
        shifted
            .checked_add_signed(ChronoDuration::days(whole_days))
            .map(FeelDate)
    }

    /// Day difference as a duration (`self - other`)
    pub fn since(&self, other: &FeelDate) -> FeelDuration {
        FeelDuration::from_days(self.0.signed_duration_since(other.0).num_days())
    }
}

impl fmt::Display for FeelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Time of day (ISO-8601 `HH:MM:SS[.fff]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeelTime(NaiveTime);

impl FeelTime {
    pub const FORMAT: &'static str = "time (HH:MM:SS)";

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(FeelTime)
            .map_err(|_| CoreError::type_error(Self::FORMAT, "string", raw))
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        FeelTime(time)
    }

    pub fn naive(&self) -> NaiveTime {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }
}

impl fmt::Display for FeelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.nanosecond() == 0 {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S%.f"))
        }
    }
}

/// Duration with independent calendar and clock segments.
///
/// Segments carry their own sign; a literal with a leading `-` negates every
/// segment. `to_seconds` treats a month as 30 days and a year as 365 days,
/// so it is an approximation rather than a calendar-accurate length.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeelDuration {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: f64,
}

impl FeelDuration {
    pub const FORMAT: &'static str = "duration (P[n]Y[n]M[n]DT[n]H[n]M[n]S)";

    pub fn from_days(days: i64) -> Self {
        FeelDuration {
            days,
            ..Default::default()
        }
    }

    pub fn from_seconds(seconds: f64) -> Self {
        FeelDuration {
            seconds,
            ..Default::default()
        }
    }

    /// Parse `P[n]Y[n]M[n]W[n]DT[n]H[n]M[n]S`; missing segments are zero
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || CoreError::type_error(Self::FORMAT, "string", raw);
        let trimmed = raw.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let body = body.strip_prefix('P').ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }

        let mut duration = FeelDuration::default();
        let mut in_time = false;
        let mut number = String::new();
        let mut segments = 0;
        let mut time_segments = 0;

        for c in body.chars() {
            match c {
                'T' if !in_time && number.is_empty() => in_time = true,
                '0'..='9' | '.' => number.push(c),
                unit => {
                    if number.is_empty() {
                        return Err(invalid());
                    }
                    let is_fraction = number.contains('.');
                    if is_fraction && !(in_time && unit == 'S') {
                        return Err(invalid());
                    }
                    let whole = || number.parse::<i64>().map_err(|_| invalid());
                    match (in_time, unit) {
                        (false, 'Y') => duration.years = whole()?,
                        (false, 'M') => duration.months = whole()?,
                        (false, 'W') => duration.days += whole()? * 7,
                        (false, 'D') => duration.days += whole()?,
                        (true, 'H') => duration.hours = whole()?,
                        (true, 'M') => duration.minutes = whole()?,
                        (true, 'S') => duration.seconds = number.parse::<f64>().map_err(|_| invalid())?,
                        _ => return Err(invalid()),
                    }
                    number.clear();
                    segments += 1;
                    if in_time {
                        time_segments += 1;
                    }
                }
            }
        }

        if !number.is_empty() || segments == 0 || (in_time && time_segments == 0) {
            return Err(invalid());
        }

        Ok(if negative { duration.negate() } else { duration })
    }

    pub fn to_seconds(&self) -> f64 {
        let days = self.years * 365 + self.months * 30 + self.days;
        days as f64 * SECONDS_PER_DAY
            + (self.hours * 3600 + self.minutes * 60) as f64
            + self.seconds
    }

    pub fn negate(&self) -> Self {
        FeelDuration {
            years: -self.years,
            months: -self.months,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        FeelDuration {
            years: self.years + other.years,
            months: self.months + other.months,
            days: self.days + other.days,
            hours: self.hours + other.hours,
            minutes: self.minutes + other.minutes,
            seconds: self.seconds + other.seconds,
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        let scale_int = |v: i64| (v as f64 * factor).round() as i64;
        FeelDuration {
            years: scale_int(self.years),
            months: scale_int(self.months),
            days: scale_int(self.days),
            hours: scale_int(self.hours),
            minutes: scale_int(self.minutes),
            seconds: self.seconds * factor,
        }
    }

    fn is_negative(&self) -> bool {
        let parts = [self.years, self.months, self.days, self.hours, self.minutes];
        let any_negative = parts.iter().any(|p| *p < 0) || self.seconds < 0.0;
        let any_positive = parts.iter().any(|p| *p > 0) || self.seconds > 0.0;
        any_negative && !any_positive
    }
}

impl PartialEq for FeelDuration {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl PartialOrd for FeelDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_seconds().partial_cmp(&other.to_seconds())
    }
}

impl fmt::Display for FeelDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = if self.is_negative() {
            write!(f, "-")?;
            self.negate()
        } else {
            *self
        };
        write!(f, "P")?;
        if d.years != 0 {
            write!(f, "{}Y", d.years)?;
        }
        if d.months != 0 {
            write!(f, "{}M", d.months)?;
        }
        if d.days != 0 {
            write!(f, "{}D", d.days)?;
        }
        let has_clock = d.hours != 0 || d.minutes != 0 || d.seconds != 0.0;
        if has_clock {
            write!(f, "T")?;
            if d.hours != 0 {
                write!(f, "{}H", d.hours)?;
            }
            if d.minutes != 0 {
                write!(f, "{}M", d.minutes)?;
            }
            if d.seconds != 0.0 {
                write!(f, "{}S", d.seconds)?;
            }
        } else if d.years == 0 && d.months == 0 && d.days == 0 {
            write!(f, "T0S")?;
        }
        Ok(())
    }
}
