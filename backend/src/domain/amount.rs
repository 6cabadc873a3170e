//! Monetary amounts.
//!
//! Search aggregations sum `_value * 100` so totals stay exact in integer
//! cents; the fractional part of that scaled sum is noise and is dropped.

use std::iter::Sum;
use std::ops::Add;

/// Whole cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Wrap a cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Interpret a search engine sum over values scaled by 100.
    ///
    /// Non-finite sums are treated as zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scaled sums are truncated to whole cents"
    )]
    pub fn from_scaled_sum(value: f64) -> Self {
        if value.is_finite() {
            Self(value.trunc() as i64)
        } else {
            Self::ZERO
        }
    }

    /// Raw cent count.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Amount in dollars.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "dollar amounts are reported as JSON numbers"
    )]
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
