//! # Money Module
//!
//! Provides the `Money` and `Rate` types used by every split calculation.
//!
//! ## Why Integer Money AND Integer Rates?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  4850 × 0.06 in f64 = 290.99999999999994   → round() = 291 by luck     │
//! │  Other amounts land on the wrong side of .5 and lose a cent.           │
//! │                                                                         │
//! │  OUR SOLUTION                                                           │
//! │    Money: i64 cents (R$100.00 = 10000)                                 │
//! │    Rate:  u32 parts-per-million (6% = 60_000)                          │
//! │    Product in i128, rounded half away from zero, once per multiply     │
//! │                                                                         │
//! │  4850 × 60_000 = 291_000_000 → /1_000_000 = 291 exactly                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use salonpay_core::money::{Money, Rate};
//!
//! let gross = Money::from_cents(10_000);               // R$ 100,00
//! let fee = gross.apply_rate(Rate::from_ppm(29_900));  // 2.99%
//! assert_eq!(fee.cents(), 299);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::ValidationError;

/// Number of rate units in a whole (1.0 == 100%).
pub const PPM_SCALE: u32 = 1_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: net amounts can go negative when product cost
///   exceeds the salon share
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// gross ──► gateway fee ──► after fee ──┬──► professional commission ──► professional net
///                                       └──► salon share ──► salon tax ──► salon net
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use salonpay_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (reais) portion.
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (centavos) portion, always 0-99.
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
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

    /// Addition that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtraction that returns `None` instead of overflowing.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies by a rate and rounds to the nearest cent, half away from zero.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND HALF AWAY FROM ZERO                                          │
    /// │                                                                     │
    /// │   4850.5 →  4851        -4850.5 → -4851                            │
    /// │   4850.4 →  4850        -4850.4 → -4850                            │
    /// │                                                                     │
    /// │  Integer form (Rust `/` truncates toward zero):                    │
    /// │    p = cents × ppm                                                  │
    /// │    p ≥ 0:  (p + 500_000) / 1_000_000                               │
    /// │    p < 0:  (p − 500_000) / 1_000_000                               │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// Every multiplication in the split is rounded here, immediately, before
    /// the result takes part in any subtraction.
    ///
    /// ## Example
    /// ```rust
    /// use salonpay_core::money::{Money, Rate};
    ///
    /// let after_fee = Money::from_cents(9701);
    /// let half = Rate::from_ppm(500_000);
    /// assert_eq!(after_fee.apply_rate(half).cents(), 4851); // 4850.5 → 4851
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 keeps i64::MAX × 1_000_000 in range
        let product = self.0 as i128 * rate.ppm() as i128;
        let scale = PPM_SCALE as i128;
        let half = scale / 2;
        let rounded = if product >= 0 {
            (product + half) / scale
        } else {
            (product - half) / scale
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display in Brazilian format, for logs and debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}R$ {},{:02}",
            sign,
            self.reais().abs(),
            self.centavos_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// A fraction in `[0, 1]`, held as parts-per-million.
///
/// ## Why ppm?
/// 1 ppm = 0.0001%. Gateway fees like 2.99% (29_900 ppm) and commissions
/// like 33.3333% (333_333 ppm) fit exactly, and every product with a cent
/// amount stays in integer arithmetic.
///
/// At the boundary (settings rows, rule rows, JSON) a rate is a plain
/// float fraction; serde converts through [`Rate::from_fraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from parts-per-million. Values above 1_000_000 are clamped.
    #[inline]
    pub const fn from_ppm(ppm: u32) -> Self {
        if ppm > PPM_SCALE {
            Rate(PPM_SCALE)
        } else {
            Rate(ppm)
        }
    }

    /// Creates a rate from a float fraction (0.0299 = 2.99%).
    ///
    /// ## Rules
    /// - Must be finite
    /// - Must be within `[0, 1]`
    /// - Rounded to the nearest ppm
    ///
    /// ## Example
    /// ```rust
    /// use salonpay_core::money::Rate;
    ///
    /// assert_eq!(Rate::from_fraction(0.0299).unwrap().ppm(), 29_900);
    /// assert!(Rate::from_fraction(1.2).is_err());
    /// ```
    pub fn from_fraction(value: f64) -> Result<Self, ValidationError> {
        Self::parse_fraction("rate", value)
    }

    /// Same as [`Rate::from_fraction`], naming the offending field on error.
    pub fn parse_fraction(field: &str, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::RateOutOfRange {
                field: field.to_string(),
                value,
            });
        }
        Ok(Rate((value * PPM_SCALE as f64).round() as u32))
    }

    /// Returns the rate in parts-per-million.
    #[inline]
    pub const fn ppm(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a float fraction (for display and serialization).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 as f64 / PPM_SCALE as f64
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl TryFrom<f64> for Rate {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rate::from_fraction(value)
    }
}

impl From<Rate> for f64 {
    fn from(rate: Rate) -> f64 {
        rate.fraction()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}%", self.0 as f64 / 10_000.0)
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
        assert_eq!(money.reais(), 10);
        assert_eq!(money.centavos_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(10_000).to_string(), "R$ 100,00");
        assert_eq!(Money::from_cents(505).to_string(), "R$ 5,05");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$ 5,50");
        assert_eq!(Money::zero().to_string(), "R$ 0,00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        let one = Money::from_cents(1);

        assert_eq!(max.checked_add(one), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(one), None);
        assert_eq!(one.checked_sub(max), Some(Money::from_cents(1 - i64::MAX)));
        assert_eq!(one.checked_add(one), Some(Money::from_cents(2)));
    }

    #[test]
    fn test_apply_rate_exact() {
        let amount = Money::from_cents(4850);
        assert_eq!(amount.apply_rate(Rate::from_ppm(60_000)).cents(), 291);
    }

    #[test]
    fn test_apply_rate_rounds_half_away_from_zero() {
        let half = Rate::from_ppm(500_000);

        assert_eq!(Money::from_cents(9701).apply_rate(half).cents(), 4851);
        assert_eq!(Money::from_cents(1).apply_rate(half).cents(), 1);
        assert_eq!(Money::from_cents(-9701).apply_rate(half).cents(), -4851);
    }

    #[test]
    fn test_apply_rate_rounds_below_half_down() {
        // 9701 × 0.06 = 582.06
        let amount = Money::from_cents(9701);
        assert_eq!(amount.apply_rate(Rate::from_ppm(60_000)).cents(), 582);

        // 1 × 0.0299 = 0.0299
        let one = Money::from_cents(1);
        assert_eq!(one.apply_rate(Rate::from_ppm(29_900)).cents(), 0);
    }

    #[test]
    fn test_apply_rate_large_amount_does_not_overflow() {
        let amount = Money::from_cents(i64::MAX / 2);
        let full = Rate::from_ppm(PPM_SCALE);
        assert_eq!(amount.apply_rate(full).cents(), i64::MAX / 2);
    }

    #[test]
    fn test_rate_from_fraction() {
        assert_eq!(Rate::from_fraction(0.0299).unwrap().ppm(), 29_900);
        assert_eq!(Rate::from_fraction(0.06).unwrap().ppm(), 60_000);
        assert_eq!(Rate::from_fraction(0.5).unwrap().ppm(), 500_000);
        assert_eq!(Rate::from_fraction(0.0).unwrap(), Rate::zero());
        assert_eq!(Rate::from_fraction(1.0).unwrap().ppm(), PPM_SCALE);
    }

    #[test]
    fn test_rate_rejects_out_of_range() {
        assert!(Rate::from_fraction(-0.01).is_err());
        assert!(Rate::from_fraction(1.0001).is_err());
        assert!(Rate::from_fraction(f64::NAN).is_err());
        assert!(Rate::from_fraction(f64::INFINITY).is_err());

        let err = Rate::parse_fraction("tax_rate", 2.0).unwrap_err();
        assert!(err.to_string().starts_with("tax_rate"));
    }

    #[test]
    fn test_rate_from_ppm_clamps() {
        assert_eq!(Rate::from_ppm(2_000_000).ppm(), PPM_SCALE);
    }

    #[test]
    fn test_rate_serde_as_fraction() {
        let rate = Rate::from_ppm(29_900);
        assert_eq!(serde_json::to_string(&rate).unwrap(), "0.0299");

        let parsed: Rate = serde_json::from_str("0.5").unwrap();
        assert_eq!(parsed.ppm(), 500_000);

        assert!(serde_json::from_str::<Rate>("1.5").is_err());
    }
}
