//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. The type is currency-neutral; the symbol comes from settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use costbook_cli::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.units(), 10);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// The cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Multiply a unit amount by a (possibly fractional) quantity,
    /// rounding half away from zero to the nearest cent.
    ///
    /// # Examples
    /// ```
    /// use costbook_cli::models::Money;
    /// let unit = Money::from_cents(250);
    /// assert_eq!(unit.times_quantity(1.5), Money::from_cents(375));
    /// ```
    pub fn times_quantity(&self, quantity: f64) -> Self {
        Self((self.0 as f64 * quantity).round() as i64)
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "-$10.50", "$-10.50",
    /// "€1,250.00", "10". At most one currency symbol may lead the digits and
    /// at most two fraction digits are allowed.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s;
        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        let mut rest = s.trim();
        let mut negative = false;
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped;
        }
        if let Some(symbol) = rest.chars().next() {
            if !symbol.is_ascii_digit() && symbol != '.' && symbol != '-' {
                rest = &rest[symbol.len_utf8()..];
            }
        }
        if let Some(stripped) = rest.strip_prefix('-') {
            if negative {
                return Err(invalid());
            }
            negative = true;
            rest = stripped;
        }

        let digits: String = rest.chars().filter(|c| *c != ',').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }

        let (units, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));
        if fraction.len() > 2
            || fraction.contains('.')
            || (units.is_empty() && fraction.is_empty())
        {
            return Err(invalid());
        }

        let units: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -cents } else { cents }))
    }

    /// Add two amounts, returning `None` on overflow
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Add two amounts, clamping at the bounds of the representable range
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Format with a currency symbol and thousands separators
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            group_thousands(self.units().unsigned_abs()),
            self.cents_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(1050).format_with_symbol("$"), "$10.50");
        assert_eq!(Money::from_cents(-1050).format_with_symbol("$"), "-$10.50");
        assert_eq!(
            Money::from_cents(123_456_789).format_with_symbol("€"),
            "€1,234,567.89"
        );
        assert_eq!(Money::from_cents(100_000).format_with_symbol(""), "1,000.00");
        assert_eq!(Money::from_cents(-50).format_with_symbol("$"), "-$0.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse("€1,250.00").unwrap().cents(), 125_000);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("$").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("ten").is_err());
        assert!(Money::parse("abc10").is_err());
        assert!(Money::parse("$$10").is_err());
        assert!(Money::parse("--10").is_err());
        assert!(Money::parse("-$-10").is_err());
        assert!(Money::parse(".").is_err());
    }

    #[test]
    fn test_parse_sign_around_symbol() {
        assert_eq!(Money::parse("$-10").unwrap().cents(), -1000);
        assert_eq!(Money::parse("-$10").unwrap().cents(), -1000);
        assert_eq!(Money::parse("$-25.00").unwrap().cents(), -2500);
        assert_eq!(Money::parse("-€1,250.5").unwrap().cents(), -125_050);
    }

    #[test]
    fn test_parse_rejects_extra_fraction_digits() {
        assert!(Money::parse("10.999").is_err());
        assert!(Money::parse("0.001").is_err());
        assert_eq!(Money::parse("10.99").unwrap().cents(), 1099);
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert_eq!(
            Money::parse("92233720368547758").unwrap().cents(),
            9_223_372_036_854_775_800
        );
        assert!(Money::parse("92233720368547759").is_err());
        assert!(Money::parse("92233720368547758.08").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_checked_and_saturating_add() {
        let max = Money::from_cents(i64::MAX);
        let one = Money::from_cents(1);
        assert_eq!(one.checked_add(one), Some(Money::from_cents(2)));
        assert_eq!(max.checked_add(one), None);
        assert_eq!(max.saturating_add(one), max);
    }

    #[test]
    fn test_times_quantity() {
        let unit = Money::from_cents(333);
        assert_eq!(unit.times_quantity(3.0), Money::from_cents(999));
        assert_eq!(unit.times_quantity(0.5), Money::from_cents(167));
        assert_eq!(unit.times_quantity(0.0), Money::zero());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((-a).abs(), a);

        let amounts = [a, b, Money::from_cents(1)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
