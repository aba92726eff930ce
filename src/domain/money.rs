use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::Error;

/// A currency amount with cent precision.
///
/// Arithmetic is exact (backed by [`Decimal`]); rounding only happens when a
/// value is explicitly brought back to cents with [`Money::round_cents`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT_DECIMALS: u32 = 2;
    /// Largest difference still treated as equal when checking split sums.
    pub const TOLERANCE: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));
    /// Largest accepted amount, 1 000 000 000 000.00.
    pub const MAX: Money = Money(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::CENT_DECIMALS))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::CENT_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Drops everything past the cents, so the result never exceeds `self` in size.
    pub fn truncate_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::CENT_DECIMALS, RoundingStrategy::ToZero),
        )
    }

    pub fn saturating_add(self, rhs: Money) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// `true` when the amount lies within `-MAX..=MAX`.
    pub fn in_range(&self) -> bool {
        self.abs() <= Self::MAX
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// `true` when both amounts differ by at most [`Money::TOLERANCE`].
    pub fn approx_eq(self, other: Money) -> bool {
        (self - other).abs() <= Self::TOLERANCE
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut cents = self.round_cents().0;
        cents.rescale(Self::CENT_DECIMALS);
        write!(f, "{}", cents)
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let amount = Decimal::from_str(s)
            .map_err(|_| Error::Validation(format!("Invalid amount: {}", s)))?;

        if amount.normalize().scale() > Self::CENT_DECIMALS {
            return Err(Error::Validation(format!(
                "Amount {} has more than {} decimal places",
                s,
                Self::CENT_DECIMALS
            )));
        }

        let amount = Self(amount);
        if !amount.in_range() {
            return Err(Error::Validation(format!(
                "Amount {} exceeds the maximum of {}",
                s,
                Self::MAX
            )));
        }

        Ok(amount)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn parses_and_formats_cents() {
        let m: Money = "33.3".parse().unwrap();
        assert_eq!(m.to_string(), "33.30");
        let m: Money = " 150 ".parse().unwrap();
        assert_eq!(m.to_string(), "150.00");
        let m: Money = "-12.05".parse().unwrap();
        assert_eq!(m.to_string(), "-12.05");
        // trailing zeros beyond cents are harmless
        let m: Money = "10.500".parse().unwrap();
        assert_eq!(m, Money::from_cents(1050));
    }

    #[test]
    fn rejects_sub_cent_precision_and_garbage() {
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn rounds_midpoint_away_from_zero() {
        let third = Money::new(rust_decimal::Decimal::new(100, 0) / rust_decimal::Decimal::new(3, 0));
        assert_eq!(third.round_cents(), Money::from_cents(3333));
        assert_eq!(Money::new(rust_decimal::Decimal::new(1005, 3)).round_cents(), Money::from_cents(101));
        assert_eq!(Money::new(rust_decimal::Decimal::new(-1005, 3)).round_cents(), Money::from_cents(-101));
    }

    #[test]
    fn truncates_toward_zero() {
        let third = Money::new(rust_decimal::Decimal::new(2, 0) / rust_decimal::Decimal::new(3, 0));
        assert_eq!(third.truncate_cents(), Money::from_cents(66));
        assert_eq!(Money::new(rust_decimal::Decimal::new(1005, 3)).truncate_cents(), Money::from_cents(100));
        assert_eq!(Money::new(rust_decimal::Decimal::new(-1009, 3)).truncate_cents(), Money::from_cents(-100));
    }

    #[test]
    fn rejects_amounts_beyond_the_maximum() {
        assert_eq!(Money::MAX, Money::from_cents(100_000_000_000_000));
        assert_eq!("1000000000000".parse::<Money>().unwrap(), Money::MAX);
        assert!("1000000000000.01".parse::<Money>().is_err());
        assert!("-1000000000000.01".parse::<Money>().is_err());
        assert!("50000000000000000000000000000".parse::<Money>().is_err());
    }

    #[test]
    fn saturating_add_does_not_overflow() {
        let huge = Money::new(rust_decimal::Decimal::MAX);
        assert_eq!(huge.saturating_add(huge), huge);
        assert_eq!(
            Money::MAX.saturating_add(Money::from_cents(1)),
            Money::from_cents(100_000_000_000_001)
        );
    }

    #[test]
    fn approx_eq_uses_one_cent_tolerance() {
        let total = Money::from_cents(10_000);
        assert!(total.approx_eq(Money::from_cents(9_999)));
        assert!(total.approx_eq(Money::from_cents(10_001)));
        assert!(!total.approx_eq(Money::from_cents(9_998)));
    }
}
