//! Fixed point arithmetic for all intermediate margin math.
//!
//! External amounts arrive as unsigned integers at an asset specific decimal
//! count (8 for oracle prices and option amounts, 6 for USDC, 18 for WETH...).
//! They are lifted into `FixedPoint` once, every multiply/divide chain runs at
//! full internal precision, and the result is projected back exactly once with
//! an explicit rounding direction.
//!
//! Every primitive is checked. Overflow and division by zero are returned as
//! `MathError`, never wrapped or panicked on.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest decimal count a value can be lifted from or projected to.
pub const MAX_DECIMALS: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Negative value cannot be projected to an unsigned amount")]
    NegativeValue,
}

/// Signed decimal with explicit sign. Subtraction below zero stays negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FixedPoint(Decimal);

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint(Decimal::ZERO);
    pub const ONE: FixedPoint = FixedPoint(Decimal::ONE);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Lift an external integer carrying `decimals` fractional digits.
    pub fn from_scaled(value: u128, decimals: u32) -> Result<Self, MathError> {
        if decimals > MAX_DECIMALS {
            return Err(MathError::Overflow);
        }
        let signed = i128::try_from(value).map_err(|_| MathError::Overflow)?;
        Decimal::try_from_i128_with_scale(signed, decimals)
            .map(Self)
            .map_err(|_| MathError::Overflow)
    }

    pub fn from_unscaled(value: u128) -> Result<Self, MathError> {
        Self::from_scaled(value, 0)
    }

    /// Project back to an external integer at `decimals`.
    ///
    /// Truncates toward zero unless `round_up` is set, in which case any
    /// remainder below the last external digit bumps the result by one.
    pub fn to_scaled(&self, decimals: u32, round_up: bool) -> Result<u128, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeValue);
        }
        let factor = pow10(decimals)?;
        let scaled = self.0.checked_mul(factor).ok_or(MathError::Overflow)?;
        let rounded = if round_up { scaled.ceil() } else { scaled.trunc() };
        rounded.to_u128().ok_or(MathError::Overflow)
    }

    pub fn add(&self, other: FixedPoint) -> Result<Self, MathError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn sub(&self, other: FixedPoint) -> Result<Self, MathError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn mul(&self, other: FixedPoint) -> Result<Self, MathError> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn div(&self, other: FixedPoint) -> Result<Self, MathError> {
        if other.0.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        self.0
            .checked_div(other.0)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    pub fn min(self, other: FixedPoint) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(self, other: FixedPoint) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_greater_than(&self, other: FixedPoint) -> bool {
        self.0 > other.0
    }

    pub fn is_greater_or_equal(&self, other: FixedPoint) -> bool {
        self.0 >= other.0
    }

    pub fn is_equal(&self, other: FixedPoint) -> bool {
        self.0 == other.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn pow10(decimals: u32) -> Result<Decimal, MathError> {
    if decimals > MAX_DECIMALS {
        return Err(MathError::Overflow);
    }
    Decimal::try_from_i128_with_scale(10i128.pow(decimals), 0).map_err(|_| MathError::Overflow)
}
