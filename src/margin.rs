//! Max-loss (spread) margin for live vaults.
//!
//! A short option hedged by a long option of the same product only needs
//! collateral for the worst case loss of the pair. Puts are sized in the
//! strike asset, calls in the underlying; the calculator converts either to
//! the collateral asset afterwards.

use serde::{Deserialize, Serialize};

use crate::fixed_point::{FixedPoint, MathError};

/// How a live vault's requirement is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginKind {
    /// Fully collateralized to the maximum loss of the position.
    MaxLoss,
    /// Partially collateralized via the naked margin curve.
    Naked,
}

impl TryFrom<u8> for MarginKind {
    type Error = MarginError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(MarginKind::MaxLoss),
            1 => Ok(MarginKind::Naked),
            other => Err(MarginError::InvalidMarginKind(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MarginError {
    #[error("Time to expiry {0}s is beyond the naked margin curve")]
    TimeOutOfRange(u64),

    #[error("Unknown margin kind selector {0}")]
    InvalidMarginKind(u8),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Put spread requirement in strike asset units:
/// `max(short * short_strike - long_strike * min(short, long), 0)`.
pub fn put_spread_requirement(
    short_amount: FixedPoint,
    short_strike: FixedPoint,
    long_amount: FixedPoint,
    long_strike: FixedPoint,
) -> Result<FixedPoint, MathError> {
    let short_notional = short_amount.mul(short_strike)?;
    let hedged_notional = long_strike.mul(short_amount.min(long_amount))?;
    Ok(short_notional.sub(hedged_notional)?.max(FixedPoint::ZERO))
}

/// Call spread requirement in underlying units.
///
/// With no long strike only the unhedged amount counts. Otherwise the
/// strike gap per long strike is also a floor, since a higher-strike long
/// leaves that fraction of each short uncovered.
pub fn call_spread_requirement(
    short_amount: FixedPoint,
    short_strike: FixedPoint,
    long_amount: FixedPoint,
    long_strike: FixedPoint,
) -> Result<FixedPoint, MathError> {
    let unhedged = short_amount.sub(long_amount)?.max(FixedPoint::ZERO);
    if long_strike.is_zero() {
        return Ok(unhedged);
    }
    let strike_gap = long_strike
        .sub(short_strike)?
        .mul(short_amount)?
        .div(long_strike)?;
    Ok(strike_gap.max(unhedged))
}
