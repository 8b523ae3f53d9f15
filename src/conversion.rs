//! Cross-asset amount conversion using oracle prices.
//!
//! `amount * price(from) / price(to)`, with the multiplication done first so
//! no precision is dropped before the division. Converting an asset into
//! itself is the identity and never touches the oracle.

use crate::fixed_point::FixedPoint;
use crate::price_feed::{PriceError, PriceOracle};
use crate::types::{AssetId, Timestamp, BASE_DECIMALS};

/// Convert using live prices.
pub fn convert_live(
    oracle: &dyn PriceOracle,
    amount: FixedPoint,
    from: AssetId,
    to: AssetId,
) -> Result<FixedPoint, PriceError> {
    if from == to {
        return Ok(amount);
    }
    let from_price = live_price(oracle, from)?;
    let to_price = live_price(oracle, to)?;
    Ok(amount.mul(from_price)?.div(to_price)?)
}

/// Convert using the finalized prices recorded at `expiry`.
pub fn convert_expiry(
    oracle: &dyn PriceOracle,
    amount: FixedPoint,
    from: AssetId,
    to: AssetId,
    expiry: Timestamp,
) -> Result<FixedPoint, PriceError> {
    if from == to {
        return Ok(amount);
    }
    let from_price = finalized_expiry_price(oracle, from, expiry)?;
    let to_price = finalized_expiry_price(oracle, to, expiry)?;
    Ok(amount.mul(from_price)?.div(to_price)?)
}

pub fn live_price(oracle: &dyn PriceOracle, asset: AssetId) -> Result<FixedPoint, PriceError> {
    let raw = oracle.price(asset).ok_or(PriceError::Unavailable(asset))?;
    Ok(FixedPoint::from_scaled(raw, BASE_DECIMALS)?)
}

pub fn finalized_expiry_price(
    oracle: &dyn PriceOracle,
    asset: AssetId,
    expiry: Timestamp,
) -> Result<FixedPoint, PriceError> {
    match oracle.expiry_price(asset, expiry) {
        Some(p) if p.finalized => Ok(FixedPoint::from_scaled(p.price, BASE_DECIMALS)?),
        _ => Err(PriceError::NotFinalized { asset, expiry }),
    }
}
