//! Liquidation auction pricing.
//!
//! An undercollateralized vault is sold off in a one-day reverse auction. The
//! price per option starts at the worst-case settlement value at the oracle
//! snapshot (less a deviation allowance) and rises linearly to the full
//! collateral backing each option. Past the auction length the sale price is
//! the full backing.

use serde::{Deserialize, Serialize};

use crate::fixed_point::{FixedPoint, MathError};
use crate::types::{AssetId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationParams {
    pub auction_length_secs: u64,
    /// Tolerance for oracle drift between rounds, as a fraction of price
    /// scaled by `10^deviation_decimals`.
    pub deviation_factor: u128,
    pub deviation_decimals: u32,
}

impl Default for LiquidationParams {
    fn default() -> Self {
        Self {
            auction_length_secs: 86_400,
            deviation_factor: 0,
            deviation_decimals: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiquidationError {
    #[error("Round started at {round_start}, not before now ({now})")]
    StaleRound { round_start: Timestamp, now: Timestamp },

    #[error("Round started at {round_start}, not after last check at {last_checked}")]
    OutOfOrderCheck { round_start: Timestamp, last_checked: Timestamp },

    #[error("Vault has no short position to liquidate")]
    NoShortPosition,

    #[error("Vault is not undercollateralized at the snapshot")]
    NotUndercollateralized,

    #[error("Short option expired at {expiry}, snapshot at {snapshot}")]
    VaultExpired { expiry: Timestamp, snapshot: Timestamp },

    #[error("No dust limit configured for {0}")]
    NoDustLimitConfigured(AssetId),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl LiquidationParams {
    /// Price allowance: `deviation_factor * price / 10^deviation_decimals`.
    pub fn deviation(&self, price: FixedPoint) -> Result<FixedPoint, MathError> {
        let factor = FixedPoint::from_scaled(self.deviation_factor, self.deviation_decimals)?;
        factor.mul(price)
    }

    /// Sale price per option after `elapsed` seconds of auction.
    pub fn auction_price(
        &self,
        starting: FixedPoint,
        ending: FixedPoint,
        elapsed: u64,
    ) -> Result<FixedPoint, MathError> {
        let starting = starting.min(ending);
        if elapsed > self.auction_length_secs {
            return Ok(ending);
        }
        let length = FixedPoint::from_unscaled(self.auction_length_secs as u128)?;
        let elapsed = FixedPoint::from_unscaled(elapsed as u128)?;
        let climb = ending.sub(starting)?.mul(elapsed)?.div(length)?;
        starting.add(climb)
    }
}

/// Ordering rules for a liquidation snapshot: the round must have started
/// before now and strictly after the last recorded check for the vault.
pub fn check_round_order(
    round_start: Timestamp,
    last_checked: Timestamp,
    now: Timestamp,
) -> Result<(), LiquidationError> {
    if round_start >= now {
        return Err(LiquidationError::StaleRound { round_start, now });
    }
    if round_start <= last_checked {
        return Err(LiquidationError::OutOfOrderCheck { round_start, last_checked });
    }
    Ok(())
}

/// Worst-case settlement value per option at the snapshot price, in
/// collateral units. Puts are collateralized in the strike asset, calls in
/// the underlying, hence the division by price for calls.
pub fn auction_starting_price(
    strike: FixedPoint,
    price: FixedPoint,
    deviation: FixedPoint,
    is_put: bool,
) -> Result<FixedPoint, MathError> {
    let intrinsic = if is_put {
        strike.sub(price)?.sub(deviation)?
    } else {
        price.sub(strike)?.sub(deviation)?
    };
    let intrinsic = intrinsic.max(FixedPoint::ZERO);
    if is_put {
        Ok(intrinsic)
    } else {
        intrinsic.div(price)
    }
}

/// Collateral backing each short option.
pub fn full_backing_price(collateral: FixedPoint, short_amount: FixedPoint) -> Result<FixedPoint, MathError> {
    collateral.div(short_amount)
}

/// A residual balance must be strictly above the asset's dust limit.
pub fn exceeds_dust(amount: u128, dust_limit: u128) -> bool {
    amount > dust_limit
}
