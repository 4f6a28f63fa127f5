//! Decimal-preserving FEEL numbers
//!
//! Literals are held as [`Decimal`] so that `1.50` prints back as `1.50`.
//! Addition, subtraction, multiplication and remainder stay exact while both
//! operands are decimal and the result fits; division and exponentiation
//! always produce a floating result.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// FEEL number
#[derive(Debug, Clone, Copy)]
pub enum FeelNumber {
    /// Exact decimal (literals, integer and decimal arithmetic)
    Decimal(Decimal),
    /// Floating point result; never NaN or infinite
    Float(f64),
}

impl FeelNumber {
    /// Parse a numeric literal exactly as written.
    ///
    /// Literals outside the decimal's 28-digit range become finite floats.
    pub fn parse_literal(text: &str) -> Result<Self, rust_decimal::Error> {
        let exact = Decimal::from_str(text).or_else(|err| {
            // Exponents beyond the decimal's 28-digit precision can never be represented
            let exponent = text
                .split(['e', 'E'])
                .nth(1)
                .and_then(|e| e.trim_start_matches(['+', '-']).parse::<u32>().ok());
            match exponent {
                Some(e) if e <= 28 => Decimal::from_scientific(text),
                _ => Err(err),
            }
        });
        match exact {
            Ok(d) => Ok(FeelNumber::Decimal(d)),
            Err(err) => text
                .parse::<f64>()
                .ok()
                .and_then(FeelNumber::float)
                .ok_or(err),
        }
    }

    /// Wrap a float, rejecting NaN and infinities
    pub fn float(value: f64) -> Option<Self> {
        value.is_finite().then_some(FeelNumber::Float(value))
    }

    pub fn from_i64(value: i64) -> Self {
        FeelNumber::Decimal(Decimal::from(value))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            FeelNumber::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            FeelNumber::Float(f) => *f,
        }
    }

    /// Integral value, if this number has no fractional part
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            FeelNumber::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            FeelNumber::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            FeelNumber::Decimal(d) => d.is_zero(),
            FeelNumber::Float(f) => *f == 0.0,
        }
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        self.exact_or_float(other, Decimal::checked_add, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Option<Self> {
        self.exact_or_float(other, Decimal::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> Option<Self> {
        self.exact_or_float(other, Decimal::checked_mul, |a, b| a * b)
    }

    /// Division always yields a floating result; `None` on division by zero
    pub fn div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        FeelNumber::float(self.to_f64() / other.to_f64())
    }

    pub fn rem(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        self.exact_or_float(other, Decimal::checked_rem, |a, b| a % b)
    }

    pub fn pow(&self, other: &Self) -> Option<Self> {
        FeelNumber::float(self.to_f64().powf(other.to_f64()))
    }

    pub fn neg(&self) -> Self {
        match self {
            FeelNumber::Decimal(d) => FeelNumber::Decimal(-*d),
            FeelNumber::Float(f) => FeelNumber::Float(-*f),
        }
    }

    fn exact_or_float(
        &self,
        other: &Self,
        exact: fn(Decimal, Decimal) -> Option<Decimal>,
        float: fn(f64, f64) -> f64,
    ) -> Option<Self> {
        if let (FeelNumber::Decimal(a), FeelNumber::Decimal(b)) = (self, other) {
            if let Some(result) = exact(*a, *b) {
                return Some(FeelNumber::Decimal(result));
            }
        }
        FeelNumber::float(float(self.to_f64(), other.to_f64()))
    }
}

impl From<i64> for FeelNumber {
    fn from(value: i64) -> Self {
        FeelNumber::from_i64(value)
    }
}

impl From<Decimal> for FeelNumber {
    fn from(value: Decimal) -> Self {
        FeelNumber::Decimal(value)
    }
}

impl PartialEq for FeelNumber {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for FeelNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (FeelNumber::Decimal(a), FeelNumber::Decimal(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for FeelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeelNumber::Decimal(d) => write!(f, "{}", d),
            FeelNumber::Float(v) => {
                // Prefer the shortest exact decimal form so the text re-parses losslessly
                match Decimal::from_f64(*v).filter(|d| d.to_f64() == Some(*v)) {
                    Some(d) => write!(f, "{}", d.normalize()),
                    None => write!(f, "{}", v),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_preserves_scale() {
        let n = FeelNumber::parse_literal("1.50").unwrap();
        assert_eq!(n.to_string(), "1.50");
        let n = FeelNumber::parse_literal("0.1").unwrap();
        assert_eq!(n.to_string(), "0.1");
    }

    #[test]
    fn test_exact_addition() {
        let a = FeelNumber::parse_literal("0.1").unwrap();
        let b = FeelNumber::parse_literal("0.2").unwrap();
        assert_eq!(a.add(&b).unwrap().to_string(), "0.3");
    }

    #[test]
    fn test_division_is_float() {
        let a = FeelNumber::from_i64(10);
        let b = FeelNumber::from_i64(4);
        let q = a.div(&b).unwrap();
        assert!(matches!(q, FeelNumber::Float(_)));
        assert_eq!(q.to_f64(), 2.5);
        assert!(a.div(&FeelNumber::from_i64(0)).is_none());
    }

    #[test]
    fn test_cross_representation_equality() {
        let exact = FeelNumber::from_i64(3);
        let float = FeelNumber::Float(3.0);
        assert_eq!(exact, float);
        assert!(FeelNumber::Float(2.5) < exact);
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(FeelNumber::parse_literal("7.0").unwrap().to_i64(), Some(7));
        assert_eq!(FeelNumber::parse_literal("7.5").unwrap().to_i64(), None);
    }

    #[test]
    fn test_oversized_literal_becomes_float() {
        let n = FeelNumber::parse_literal("100000000000000000000000000000").unwrap();
        assert!(matches!(n, FeelNumber::Float(_)));
        assert_eq!(n.to_f64(), 1e29);

        let n = FeelNumber::parse_literal("1e300").unwrap();
        assert_eq!(n.to_f64(), 1e300);
        assert_eq!(FeelNumber::parse_literal(&n.to_string()).unwrap(), n);

        assert!(FeelNumber::parse_literal("1e400").is_err());
        assert!(FeelNumber::parse_literal("1.2.3").is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(FeelNumber::float(f64::NAN).is_none());
        assert!(FeelNumber::float(f64::INFINITY).is_none());
    }
}
