//! # Money Module
//!
//! Provides the `Money` type for handling cost amounts safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    8.43 × 3 = 25.290000000000003  ❌ WRONG!                             │
//! │                                                                         │
//! │  Cost configs carry prices like 8.43 or 0.335, and combo discounts     │
//! │  produce fractions of a cent before the final rounding step.           │
//! │                                                                         │
//! │  OUR SOLUTION: Base-10 Decimal                                          │
//! │    8.43 × 3 = 25.29 exactly                                            │
//! │    Sub-cent values survive until we round ONCE, explicitly             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cogs_core::money::Money;
//!
//! let unit = Money::from_cents(843); // 8.43
//!
//! let line = unit.checked_mul_quantity(3).unwrap();
//! assert_eq!(line, Money::from_cents(2529));
//! assert_eq!(line.to_string(), "25.29");
//! ```
//!
//! ## Overflow
//! `Decimal` tops out near 7.9e28 and its operators panic past that. Every
//! operation that scales or combines config-supplied amounts goes through a
//! `checked_*` method returning `None` on overflow, so one absurd line can
//! be reported instead of aborting a whole order.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Decimal places kept by [`Money::round_to_cents`].
pub const CURRENCY_DECIMALS: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A cost amount in the snapshot's currency (major units, e.g. 8.43).
///
/// ## Design Decisions
/// - **Decimal**: exact base-10 arithmetic, no binary float drift
/// - **Unrounded by default**: arithmetic keeps full precision; callers round
///   with [`Money::round_to_cents`] at the points where policy says so
/// - **JSON number on the wire**: serializes as `8.43`, not `"8.43"`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  ProductCost.base_cost ──┬──► unit cost ──► CostResult.total_cost      │
/// │  CostOverride.cost ──────┘         │                                    │
/// │                                    ▼                                    │
/// │  ComboOverride.override_cost ──► combo unit cost (rounded to cents)    │
/// │                                    │                                    │
/// │                                    ▼                                    │
/// │                     OrderCost.total_cost (rounded once, at the end)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    Decimal,
);

impl Money {
    /// Creates a Money value from a decimal amount in major units.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use cogs_core::money::Money;
    ///
    /// let cost = Money::from_cents(950);
    /// assert_eq!(cost.to_string(), "9.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DECIMALS))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds to currency minor units, midpoint away from zero.
    ///
    /// ## Rounding Policy
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND ONCE, AT THE EDGE                                            │
    /// │                                                                     │
    /// │  Per-line rounding:   0.335 + 0.335 + 0.335                        │
    /// │                     → 0.34  + 0.34  + 0.34  = 1.02  (drifted)      │
    /// │                                                                     │
    /// │  Final rounding:      0.335 + 0.335 + 0.335 = 1.005 → 1.01         │
    /// │                                                                     │
    /// │  Only combo unit costs and order-level sums are rounded.           │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use cogs_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let raw = Money::new(Decimal::new(1005, 3)); // 1.005
    /// assert_eq!(raw.round_to_cents(), Money::from_cents(101));
    /// ```
    pub fn round_to_cents(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiplies money by a quantity; `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use cogs_core::money::Money;
    ///
    /// let unit = Money::from_cents(843);
    /// assert_eq!(unit.checked_mul_quantity(2), Some(Money::from_cents(1686)));
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts; `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`; `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Applies a percentage discount (10 = 10%) without rounding.
    ///
    /// ## Example
    /// ```rust
    /// use cogs_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let sum = Money::from_cents(1000);
    /// let discounted = sum.checked_percentage_discount(Decimal::from(10));
    /// assert_eq!(discounted, Some(Money::from_cents(900)));
    /// ```
    pub fn checked_percentage_discount(&self, percent: Decimal) -> Option<Money> {
        let factor = Decimal::ONE.checked_sub(percent.checked_div(Decimal::ONE_HUNDRED)?)?;
        self.0.checked_mul(factor).map(Money)
    }

    /// Returns the larger of `self` and zero.
    #[inline]
    pub fn floor_at_zero(&self) -> Money {
        if self.is_negative() {
            Money::zero()
        } else {
            *self
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with two decimals and no currency symbol;
/// the currency lives on the snapshot, not on each amount.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round_to_cents().0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.amount(), dec!(10.99));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::new(dec!(9.5)).to_string(), "9.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a + b, Money::from_cents(1500));
        assert_eq!(a - b, Money::from_cents(500));
        assert_eq!(a.checked_mul_quantity(3), Some(Money::from_cents(3000)));
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(b.checked_sub(a), Some(Money::from_cents(-500)));

        let mut total = a;
        total += b;
        assert_eq!(total, Money::from_cents(1500));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let huge = Money::new(dec!(100000000000000000000)); // 1e20
        assert_eq!(huge.checked_mul_quantity(1_000_000_000_000), None);
        assert_eq!(huge.checked_mul_quantity(i64::MAX), None);

        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_add(Money::from_cents(100)), None);
        assert_eq!(Money::new(Decimal::MIN).checked_sub(Money::from_cents(100)), None);
        assert_eq!(max.checked_percentage_discount(dec!(-100)), None);
    }

    #[test]
    fn test_decimal_is_exact() {
        // 8.43 × 3 must not pick up float noise
        let unit = Money::new(dec!(8.43));
        assert_eq!(unit.checked_mul_quantity(3).unwrap().amount(), dec!(25.29));
    }

    #[test]
    fn test_round_to_cents_midpoint_away_from_zero() {
        assert_eq!(Money::new(dec!(1.005)).round_to_cents(), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(1.004)).round_to_cents(), Money::new(dec!(1.00)));
        assert_eq!(Money::new(dec!(-1.005)).round_to_cents(), Money::new(dec!(-1.01)));
    }

    #[test]
    fn test_percentage_discount() {
        let sum = Money::from_cents(1000);
        assert_eq!(sum.checked_percentage_discount(dec!(10)), Some(Money::new(dec!(9))));
        assert_eq!(
            sum.checked_percentage_discount(dec!(12.5)),
            Some(Money::new(dec!(8.75)))
        );
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::new(dec!(-3)).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_cents(5).floor_at_zero(), Money::from_cents(5));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(Money::new(dec!(-0.01)).is_negative());
    }

    #[test]
    fn test_json_is_a_number() {
        let money: Money = serde_json::from_str("8.43").unwrap();
        assert_eq!(money.amount(), dec!(8.43));

        let money: Money = serde_json::from_str("8").unwrap();
        assert_eq!(money, Money::from_cents(800));

        let json = serde_json::to_string(&Money::from_cents(950)).unwrap();
        assert_eq!(json, "9.5");
    }
}
