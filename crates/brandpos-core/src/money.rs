//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The dashboard sends amounts as JSON numbers:                           │
//! │    12.1 * 3 = 36.300000000000004                                        │
//! │                                                                         │
//! │  Comparing received >= total on such values is unreliable, and         │
//! │  summing thousands of them in a report drifts.                          │
//! │                                                                         │
//! │  OUR SOLUTION: round once at the boundary, then integer cents          │
//! │    Money::from_decimal(36.300000000000004) = 3630 cents                 │
//! │    Every comparison and sum after that is exact.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use brandpos_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2;             // $21.98
//! assert_eq!(doubled.to_decimal_string(), "21.98");
//!
//! // JSON input is rounded exactly once
//! let received = Money::from_decimal(21.979999).unwrap();
//! assert_eq!(received, doubled);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: balances (`received - total`) may be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serialized as cents**: the wire format is `*_cents` integers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding to the nearest
    /// cent (half away from zero).
    ///
    /// Returns `None` for NaN, infinities, and values outside the
    /// representable range.
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.99).unwrap().cents(), 1099);
    /// assert_eq!(Money::from_decimal(0.1 + 0.2).unwrap().cents(), 30);
    /// assert!(Money::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).checked_multiply_quantity(3), Some(Money::from_cents(897)));
    /// assert!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, clamping at the numeric bounds.
    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, clamping at the numeric bounds.
    #[inline]
    pub const fn saturating_sub(&self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// Divides a line total by its quantity, rounding to the nearest cent.
    ///
    /// Returns `None` when `qty` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// let total = Money::from_cents(1000);
    /// assert_eq!(total.divide_by_quantity(3).unwrap().cents(), 333);
    /// assert!(total.divide_by_quantity(0).is_none());
    /// ```
    pub fn divide_by_quantity(&self, qty: i64) -> Option<Self> {
        if qty == 0 {
            return None;
        }
        Some(Money(round_div(self.0 as i128, qty as i128) as i64))
    }

    /// Scales this amount by `part / whole`, rounding to the nearest cent.
    ///
    /// Returns `None` when `whole` is zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total $30.00, customer hands over $40.00
    /// Line A: $10.00 → receives $40.00 × 10/30 = $13.33
    /// Line B: $20.00 → receives $40.00 × 20/30 = $26.67
    /// ```
    pub fn share(&self, part: Money, whole: Money) -> Option<Self> {
        if whole.is_zero() {
            return None;
        }
        let scaled = self.0 as i128 * part.0 as i128;
        Some(Money(round_div(scaled, whole.0 as i128) as i64))
    }

    /// Formats as a plain two-decimal string without currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use brandpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(500).to_decimal_string(), "5.00");
    /// assert_eq!(Money::from_cents(-1).to_decimal_string(), "-0.01");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }

    /// Returns the value as a decimal number (spreadsheet cells only).
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Sums saturate at the numeric bounds instead of wrapping.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc.saturating_add(m))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_decimal_rounds_float_noise() {
        assert_eq!(Money::from_decimal(12.1 * 3.0).unwrap().cents(), 3630);
        assert_eq!(Money::from_decimal(0.005).unwrap().cents(), 1);
        assert_eq!(Money::from_decimal(-2.5).unwrap().cents(), -250);
        assert!(Money::from_decimal(f64::INFINITY).is_none());
        assert!(Money::from_decimal(1e300).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(2500).to_decimal_string(), "25.00");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
        assert_eq!(Money::from_cents(-150).to_decimal_string(), "-1.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_divide_by_quantity() {
        assert_eq!(Money::from_cents(2000).divide_by_quantity(2).unwrap().cents(), 1000);
        assert_eq!(Money::from_cents(1001).divide_by_quantity(2).unwrap().cents(), 501);
        assert_eq!(Money::from_cents(-1001).divide_by_quantity(2).unwrap().cents(), -501);
        assert!(Money::from_cents(1).divide_by_quantity(0).is_none());
    }

    #[test]
    fn test_share() {
        let received = Money::from_cents(4000);
        let whole = Money::from_cents(3000);
        let a = received.share(Money::from_cents(1000), whole).unwrap();
        let b = received.share(Money::from_cents(2000), whole).unwrap();
        assert_eq!(a.cents(), 1333);
        assert_eq!(b.cents(), 2667);
        assert!(received.share(a, Money::zero()).is_none());
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Money::from_cents(i64::MAX - 10);

        assert_eq!(
            Money::from_cents(1000).saturating_add(Money::from_cents(1)),
            Money::from_cents(1001)
        );
        assert!(Money::from_cents(1_000_000_000_000_000)
            .checked_multiply_quantity(1_000_000)
            .is_none());

        assert_eq!(big.saturating_add(big).cents(), i64::MAX);
        assert_eq!((-big).saturating_sub(big).cents(), i64::MIN);

        let total: Money = [big, big, Money::from_cents(1)].iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
