use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Money amount represented as **integer paise** (1 rupee = 100 paise).
///
/// Use this type for **all** monetary values in the engine (course fees,
/// payments, balances, revenue) to avoid floating-point drift when summing.
///
/// On the wire the backend speaks plain JSON numbers in rupees, so the serde
/// representation is a number of rupees: whole amounts serialize as integers
/// (`4000`), fractional ones as decimals (`4000.5`).
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let fee = Money::from_rupees(10_000);
/// assert_eq!(fee.paise(), 1_000_000);
/// assert_eq!(fee.to_string(), "₹10000.00");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().paise(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().paise(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer paise.
    #[must_use]
    pub const fn new(paise: i64) -> Self {
        Self(paise)
    }

    /// Creates a new amount from whole rupees, saturating at the `i64` bounds.
    #[must_use]
    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees.saturating_mul(100))
    }

    /// Returns the raw value in paise.
    #[must_use]
    pub const fn paise(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Subtraction floored at zero.
    #[must_use]
    pub fn saturating_floor_sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0).max(0))
    }

    fn as_rupees_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    fn from_rupees_f64(value: f64) -> Option<Money> {
        if !value.is_finite() {
            return None;
        }
        let paise = (value * 100.0).round();
        if paise.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(paise as i64))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let rupees = abs / 100;
        let paise = abs % 100;
        write!(f, "{sign}₹{rupees}.{paise:02}")
    }
}

// Arithmetic saturates at the i64 bounds.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal rupee string into paise.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let rupees_str = parts.next().ok_or_else(invalid)?;
        let paise_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if rupees_str.is_empty() || !rupees_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let rupees: i64 = rupees_str.parse().map_err(|_| overflow())?;

        let paise: i64 = match paise_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::InvalidAmount("too many decimals".to_string())),
                }
            }
        };

        let total = rupees
            .checked_mul(100)
            .and_then(|v| v.checked_add(paise))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_rupees_f64())
        }
    }
}

/// Anything the backend has been seen to send for an amount.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Int(rupees) => rupees
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| serde::de::Error::custom("amount too large")),
            RawAmount::Float(rupees) => Money::from_rupees_f64(rupees)
                .ok_or_else(|| serde::de::Error::custom("invalid amount")),
            RawAmount::Text(text) if text.trim().is_empty() => Ok(Money::ZERO),
            RawAmount::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_inr() {
        assert_eq!(Money::new(0).to_string(), "₹0.00");
        assert_eq!(Money::new(1).to_string(), "₹0.01");
        assert_eq!(Money::new(1050).to_string(), "₹10.50");
        assert_eq!(Money::new(-1050).to_string(), "-₹10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().paise(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().paise(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().paise(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().paise(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().paise(), 230);
    }

    #[test]
    fn parse_rejects_more_than_two_decimals() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn serde_uses_rupee_numbers() {
        assert_eq!(serde_json::to_string(&Money::from_rupees(4000)).unwrap(), "4000");
        assert_eq!(serde_json::to_string(&Money::new(400_050)).unwrap(), "4000.5");

        let parsed: Money = serde_json::from_str("4000").unwrap();
        assert_eq!(parsed, Money::from_rupees(4000));
        let parsed: Money = serde_json::from_str("12.25").unwrap();
        assert_eq!(parsed.paise(), 1225);
        let parsed: Money = serde_json::from_str("\"750\"").unwrap();
        assert_eq!(parsed, Money::from_rupees(750));
        let parsed: Money = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, Money::ZERO);
    }

    #[test]
    fn sums_and_floors() {
        let total: Money = [Money::from_rupees(4000), Money::from_rupees(3000)]
            .iter()
            .sum();
        assert_eq!(total, Money::from_rupees(7000));
        assert_eq!(
            Money::from_rupees(100).saturating_floor_sub(Money::from_rupees(150)),
            Money::ZERO
        );
    }

    #[test]
    fn arithmetic_saturates_at_the_bounds() {
        let max = Money::new(i64::MAX);
        let min = Money::new(i64::MIN);
        assert_eq!(max + Money::new(1), max);
        assert_eq!(min - Money::new(1), min);
        assert_eq!([max, max].iter().sum::<Money>(), max);
        assert_eq!(Money::from_rupees(i64::MAX), max);
        assert_eq!(Money::ZERO.saturating_floor_sub(min), max);
        assert_eq!(min.saturating_floor_sub(max), Money::ZERO);

        let mut total = max;
        total += max;
        assert_eq!(total, max);
    }
}
