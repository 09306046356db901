//! Fixed-point monetary type with 2 decimal places precision.
//!
//! Uses `rust_decimal` internally so every amount is an exact count of
//! cents. All rounding goes through [`Money::new`], which applies
//! round-half-away-from-zero at two places.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A monetary amount that always carries exactly 2 decimal places.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use expense_splitter::Money;
///
/// let amount = Money::from_str("10.005").unwrap();
/// assert_eq!(amount.to_string(), "10.01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// One cent: the largest difference still treated as "effectively zero".
    ///
    /// Balances within this band are settled, split totals within it of the
    /// expense amount are accepted.
    pub const TOLERANCE: Self = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// Largest amount or share the ledger admits: one trillion.
    ///
    /// Keeps every balance sum far inside `Decimal`'s range, so the engine's
    /// arithmetic cannot overflow.
    pub const MAX_AMOUNT: Self = Money(Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 2));

    /// Creates a new `Money`, rounding half away from zero to 2 places.
    pub fn new(value: Decimal) -> Self {
        let mut rounded =
            value.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::SCALE);
        Money(rounded)
    }

    /// Creates a `Money` from an integer number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// Returns the underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Checked addition. Returns `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money::new)
    }

    /// Returns `true` if the value lies within one cent of zero.
    pub fn is_effectively_zero(&self) -> bool {
        self.abs() <= Self::TOLERANCE
    }

    /// Returns `true` if `self` and `other` differ by at most one cent.
    pub fn approx_eq(&self, other: Money) -> bool {
        (*self - other).is_effectively_zero()
    }

    /// Share of this amount for a percentage, rounded to 2 places.
    ///
    /// ```
    /// use std::str::FromStr;
    /// use expense_splitter::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Money::from_str("100").unwrap();
    /// assert_eq!(amount.percent_of(Decimal::from(30)).to_string(), "30.00");
    /// ```
    pub fn percent_of(&self, percentage: Decimal) -> Self {
        Money::new(self.0 * percentage / Decimal::ONE_HUNDRED)
    }

    /// Per-person share when splitting evenly across `parts`, rounded to 2 places.
    ///
    /// The rounded shares are not reconciled: `parts * share` may differ
    /// from `self` by up to one cent per part. Returns `None` for zero parts.
    pub fn split_evenly(&self, parts: usize) -> Option<Self> {
        if parts == 0 {
            return None;
        }
        Some(Money::new(self.0 / Decimal::from(parts)))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())?;
        Ok(Money::new(decimal))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money::new(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money::new(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.0))
    }
}

/// Accepts both JSON numbers and strings, so ledgers saved with plain
/// numeric amounts still load.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as Deserialize>::deserialize(deserializer)?;
        Ok(Money::new(decimal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_from_str_normalizes_scale() {
        assert_eq!(money("1").to_string(), "1.00");
        assert_eq!(money("1.5").to_string(), "1.50");
        assert_eq!(money("  2.25  ").to_string(), "2.25");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(money("0.125").to_string(), "0.13");
        assert_eq!(money("0.135").to_string(), "0.14");
        assert_eq!(money("-0.125").to_string(), "-0.13");
        assert_eq!(money("0.124").to_string(), "0.12");
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let mut total = Money::ZERO;
        for _ in 0..10 {
            total += money("0.10");
        }
        assert_eq!(total, money("1.00"));
        assert_eq!((money("5") - money("7.5")).to_string(), "-2.50");
    }

    #[test]
    fn test_tolerance_band() {
        assert_eq!(Money::TOLERANCE, Money::from_cents(1));
        assert!(money("0.01").is_effectively_zero());
        assert!(money("-0.01").is_effectively_zero());
        assert!(!money("0.02").is_effectively_zero());
        assert!(money("99.99").approx_eq(money("100")));
        assert!(!money("99.00").approx_eq(money("100")));
    }

    #[test]
    fn test_split_evenly_leaves_residual() {
        let amount = money("100");
        let share = amount.split_evenly(3).unwrap();
        assert_eq!(share.to_string(), "33.33");

        let total: Money = std::iter::repeat(share).take(3).sum();
        assert_eq!(total.to_string(), "99.99");
        assert!(amount.split_evenly(0).is_none());
    }

    #[test]
    fn test_percent_of_rounds_per_share() {
        let amount = money("10");
        assert_eq!(amount.percent_of(Decimal::new(3333, 2)).to_string(), "3.33");
        assert_eq!(amount.percent_of(Decimal::new(125, 1)).to_string(), "1.25");
    }

    #[test]
    fn test_max_amount_and_checked_add() {
        assert_eq!(Money::MAX_AMOUNT.to_string(), "1000000000000.00");
        assert_eq!(
            money("1.25").checked_add(money("2.50")),
            Some(money("3.75"))
        );

        let huge = Money::new(Decimal::MAX);
        assert!(huge.checked_add(huge).is_none());
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("33.5").unwrap();
        let from_string: Money = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(from_number.to_string(), "33.50");
        assert_eq!(from_string.to_string(), "12.50");
        assert_eq!(serde_json::to_string(&from_string).unwrap(), "\"12.50\"");
    }
}
