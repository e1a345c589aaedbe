use std::fmt;
use std::ops::{Add, Sub};

use super::error::DomainError;

/// Trait representing a monetary amount with fixed precision
pub trait AmountType:
    Copy + Ord + Add<Output = Self> + Sub<Output = Self> + Default + Send + Sync + fmt::Debug
{
    /// Parse from decimal string (e.g., "1500.50")
    fn from_decimal_str(s: &str) -> Result<Self, DomainError>;

    /// Convert to decimal string with 2 decimal places
    fn to_decimal_string(&self) -> String;

    /// Checked addition, returns None on overflow
    fn checked_add(&self, other: Self) -> Option<Self>;

    /// Checked subtraction, returns None on underflow
    fn checked_sub(&self, other: Self) -> Option<Self>;

    /// Zero value
    fn zero() -> Self;
}

/// Fixed-point decimal representation using i64 (scaled by 100)
/// Represents amounts with 2 decimal places of precision (cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FixedPoint(i64);

impl FixedPoint {
    const SCALE: i64 = 100;

    /// Create from raw scaled value (cents)
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Get raw scaled value
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl AmountType for FixedPoint {
    fn from_decimal_str(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();

        let (is_negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let parts: Vec<&str> = s.split('.').collect();

        let (integer_part, decimal_part) = match parts.len() {
            1 => (parts[0], ""),
            2 => (parts[0], parts[1]),
            _ => return Err(DomainError::InvalidAmount),
        };

        // Max 2 decimal places
        if decimal_part.len() > 2 {
            return Err(DomainError::InvalidAmount);
        }

        let integer: i64 = integer_part
            .parse()
            .map_err(|_| DomainError::InvalidAmount)?;

        // Pad decimal part to 2 digits before parsing
        let decimal_str = format!("{:0<2}", decimal_part);
        let decimal: i64 = decimal_str
            .parse()
            .map_err(|_| DomainError::InvalidAmount)?;

        let scaled = integer
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(decimal))
            .ok_or(DomainError::Overflow)?;

        let result = if is_negative { -scaled } else { scaled };

        Ok(Self(result))
    }

    fn to_decimal_string(&self) -> String {
        let abs_value = self.0.abs();
        let integer_part = abs_value / Self::SCALE;
        let decimal_part = abs_value % Self::SCALE;

        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, integer_part, decimal_part)
    }

    fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    fn zero() -> Self {
        Self(0)
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_integers() {
        assert_eq!(FixedPoint::from_decimal_str("1").unwrap(), FixedPoint(100));
        assert_eq!(
            FixedPoint::from_decimal_str("1000").unwrap(),
            FixedPoint(100_000)
        );
        assert_eq!(FixedPoint::from_decimal_str("0").unwrap(), FixedPoint(0));
    }

    #[test]
    fn parse_decimals() {
        assert_eq!(
            FixedPoint::from_decimal_str("1.0").unwrap(),
            FixedPoint(100)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("1.5").unwrap(),
            FixedPoint(150)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("1.50").unwrap(),
            FixedPoint(150)
        );
        assert_eq!(FixedPoint::from_decimal_str("0.01").unwrap(), FixedPoint(1));
        assert_eq!(
            FixedPoint::from_decimal_str("123.45").unwrap(),
            FixedPoint(12_345)
        );
    }

    #[test]
    fn parse_with_whitespace() {
        assert_eq!(
            FixedPoint::from_decimal_str("  1.5  ").unwrap(),
            FixedPoint(150)
        );
    }

    #[test]
    fn parse_negative_amounts() {
        assert_eq!(
            FixedPoint::from_decimal_str("-1.5").unwrap(),
            FixedPoint(-150)
        );
        assert_eq!(
            FixedPoint::from_decimal_str("-10").unwrap(),
            FixedPoint(-1_000)
        );
    }

    #[test]
    fn reject_too_many_decimal_places() {
        assert!(FixedPoint::from_decimal_str("1.001").is_err());
        assert!(FixedPoint::from_decimal_str("1.12345").is_err());
    }

    #[test]
    fn reject_invalid_formats() {
        assert!(FixedPoint::from_decimal_str("").is_err());
        assert!(FixedPoint::from_decimal_str("abc").is_err());
        assert!(FixedPoint::from_decimal_str("1.2.3").is_err());
        assert!(FixedPoint::from_decimal_str("1..2").is_err());
    }

    #[test]
    fn to_string_formats_correctly() {
        assert_eq!(FixedPoint(100).to_decimal_string(), "1.00");
        assert_eq!(FixedPoint(150).to_decimal_string(), "1.50");
        assert_eq!(FixedPoint(1).to_decimal_string(), "0.01");
        assert_eq!(FixedPoint(0).to_decimal_string(), "0.00");
        assert_eq!(FixedPoint(12_345).to_decimal_string(), "123.45");
    }

    #[test]
    fn to_string_negative_amounts() {
        assert_eq!(FixedPoint(-150).to_decimal_string(), "-1.50");
        assert_eq!(FixedPoint(-1).to_decimal_string(), "-0.01");
    }

    #[test]
    fn round_trip_parsing() {
        let values = vec!["1.00", "1.50", "0.01", "123.45", "0.00"];

        for val in values {
            let parsed = FixedPoint::from_decimal_str(val).unwrap();
            assert_eq!(parsed.to_decimal_string(), val);
        }
    }

    #[test]
    fn checked_add_works() {
        let a = FixedPoint(100);
        let b = FixedPoint(50);
        assert_eq!(a.checked_add(b), Some(FixedPoint(150)));
    }

    #[test]
    fn checked_add_detects_overflow() {
        let max = FixedPoint(i64::MAX);
        let one = FixedPoint(1);
        assert_eq!(max.checked_add(one), None);
    }

    #[test]
    fn checked_sub_works() {
        let a = FixedPoint(100);
        let b = FixedPoint(50);
        assert_eq!(a.checked_sub(b), Some(FixedPoint(50)));
    }

    #[test]
    fn checked_sub_detects_underflow() {
        let min = FixedPoint(i64::MIN);
        let one = FixedPoint(1);
        assert_eq!(min.checked_sub(one), None);
    }

    #[test]
    fn zero_value() {
        assert_eq!(FixedPoint::zero(), FixedPoint(0));
    }

    #[test]
    fn ordering_works() {
        assert!(FixedPoint(100) > FixedPoint(50));
        assert!(FixedPoint(50) < FixedPoint(100));
        assert!(FixedPoint(50) == FixedPoint(50));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(FixedPoint::default(), FixedPoint(0));
    }
}
