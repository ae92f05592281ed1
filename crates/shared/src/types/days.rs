//! Leave-day amounts with half-day precision.
//!
//! CRITICAL: Never use floating-point for balance calculations.
//! This type wraps `rust_decimal::Decimal` and enforces the half-day grid:
//! every amount in the system is a multiple of 0.5 days.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A count of leave days, always a multiple of 0.5.
///
/// Construction via [`LeaveDays::new`] validates the grid; arithmetic on
/// two grid values stays on the grid, so the invariant holds everywhere.
/// Negative values are permitted (administrative adjustment deltas);
/// the ledger enforces sign rules per operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct LeaveDays(Decimal);

/// Error returned when an amount does not fall on the half-day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount {0} is not a multiple of 0.5 days")]
pub struct InvalidLeaveDays(pub Decimal);

impl LeaveDays {
    /// Zero days.
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// Exactly half a day.
    pub const HALF: Self = Self(Decimal::from_parts(5, 0, 0, false, 1));
    /// Exactly one day.
    pub const ONE: Self = Self(Decimal::ONE);

    /// Creates a day amount, validating the half-day grid.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLeaveDays`] if `days` is not a multiple of 0.5.
    pub fn new(days: Decimal) -> Result<Self, InvalidLeaveDays> {
        if (days * Decimal::TWO).is_integer() {
            Ok(Self(days))
        } else {
            Err(InvalidLeaveDays(days))
        }
    }

    /// Creates an amount from a whole number of days.
    #[must_use]
    pub fn whole(days: u32) -> Self {
        Self(Decimal::from(days))
    }

    /// Rounds an arbitrary decimal down to the nearest half-day step.
    ///
    /// Used where policy percentages leave the grid, e.g. a carry-forward
    /// of 80% of 11.5 days (9.2) becomes 9.0.
    #[must_use]
    pub fn floor_to_grid(value: Decimal) -> Self {
        Self((value * Decimal::TWO).floor() / Decimal::TWO)
    }

    /// Applies a percentage and floors the result to the grid.
    #[must_use]
    pub fn percent_of(self, percentage: Decimal) -> Self {
        Self::floor_to_grid(self.0 * percentage / Decimal::ONE_HUNDRED)
    }

    /// Subtraction floored at zero; used when crediting `used` back.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other >= self { Self::ZERO } else { Self(self.0 - other.0) }
    }

    /// Returns the inner decimal value.
    #[must_use]
    pub const fn into_inner(self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl std::ops::Add for LeaveDays {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for LeaveDays {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for LeaveDays {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for LeaveDays {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Neg for LeaveDays {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for LeaveDays {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, d| acc + d)
    }
}

impl std::fmt::Display for LeaveDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for LeaveDays {
    type Error = InvalidLeaveDays;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LeaveDays> for Decimal {
    fn from(days: LeaveDays) -> Self {
        days.0
    }
}
