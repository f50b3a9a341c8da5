//! Money type for transaction amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point
//! precision issues. Provides safe arithmetic operations plus the ledger's
//! monetary text format: two decimal places with thousands separators.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest absolute amount a ledger transaction may carry, in cents
    pub const MAX_ABS: i64 = 100_000_000_000_000;

    /// Create a Money amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Check that the amount is usable in a transaction
    /// (nonzero, within [`Money::MAX_ABS`])
    pub const fn in_transaction_range(&self) -> bool {
        self.0 != 0 && self.0 >= -Self::MAX_ABS && self.0 <= Self::MAX_ABS
    }

    /// Parse a monetary string into cents
    ///
    /// Accepts an optional sign, optional thousands separators, and at most
    /// two decimal digits; missing decimals are zero-padded. Examples:
    /// `"10"` → 1000, `"10.5"` → 1050, `"-1,018,821.07"` → -101882107.
    pub fn parse(s: &str) -> LedgerResult<Self> {
        let bad = || LedgerError::invalid("amount", format!("cannot parse '{s}' as a money value"));

        if !s.bytes().any(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.len() > 2 {
            return Err(bad());
        }

        let mut digits = String::with_capacity(s.len() + 2);
        digits.extend(whole.chars().filter(|&c| c != ','));
        for i in 0..2 {
            digits.push(frac.as_bytes().get(i).copied().unwrap_or(b'0') as char);
        }

        digits.parse::<i64>().map(Self).map_err(|_| bad())
    }
}

impl fmt::Display for Money {
    /// Two decimal places, comma thousands separators, leading minus sign
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mag = self.0.unsigned_abs();
        let (whole, frac) = (mag / 100, mag % 100);

        let plain = whole.to_string();
        let mut grouped = String::with_capacity(plain.len() + plain.len() / 3);
        for (i, c) in plain.chars().enumerate() {
            if i > 0 && (plain.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{grouped}.{frac:02}")
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(1050).to_string(), "10.50");
        assert_eq!(Money::from_cents(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_cents(123456).to_string(), "1,234.56");
        assert_eq!(Money::from_cents(101882100).to_string(), "1,018,821.00");
        assert_eq!(
            Money::from_cents(-100_000_000_000_000).to_string(),
            "-1,000,000,000,000.00"
        );
        assert_eq!(
            Money::from_cents(i64::MIN).to_string(),
            "-92,233,720,368,547,758.08"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.").unwrap().cents(), 1000);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("1,018,821.07").unwrap().cents(), 101882107);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert!(Money::parse("10.505").is_err());
        assert!(Money::parse("ten").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_parse_display_round_trip() {
        for cents in [0, 1, -1, 99, 100, -12345, 987654321, -Money::MAX_ABS] {
            let m = Money::from_cents(cents);
            assert_eq!(Money::parse(&m.to_string()).unwrap(), m);
        }
    }

    #[test]
    fn test_transaction_range() {
        assert!(!Money::zero().in_transaction_range());
        assert!(Money::from_cents(1).in_transaction_range());
        assert!(Money::from_cents(-Money::MAX_ABS).in_transaction_range());
        assert!(Money::from_cents(Money::MAX_ABS).in_transaction_range());
        assert!(!Money::from_cents(Money::MAX_ABS + 1).in_transaction_range());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(Money::from_cents(-7).abs().cents(), 7);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
