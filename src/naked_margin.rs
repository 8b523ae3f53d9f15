//! Naked margin curve for uncovered short options.
//!
//! The curve maps time to expiry onto a probability-like factor (12 decimals)
//! through five fixed buckets, 1 to 28 days. Beyond 28 days the model is
//! undefined and the lookup fails instead of extrapolating.
//!
//! Per-unit requirement, for one short token:
//!   put, strike < 3/4 spot:   c * strike
//!   put, otherwise:           c * 3/4 spot + (strike - 3/4 spot)
//!   call, spot > 4/3 strike:  1 - (1 - c) * 4/3 * strike / spot
//!   call, otherwise:          c
//! Puts come out in strike units, calls as a fraction of one underlying.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fixed_point::FixedPoint;
use crate::margin::MarginError;

pub const CURVE_DECIMALS: u32 = 12;

const DAY: u64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Upper bound of the bucket, inclusive.
    pub max_time_to_expiry_secs: u64,
    /// Curve value at 12 decimals.
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NakedMarginParams {
    /// Ascending by `max_time_to_expiry_secs`.
    pub curve: Vec<CurvePoint>,
}

impl Default for NakedMarginParams {
    fn default() -> Self {
        Self {
            curve: vec![
                CurvePoint { max_time_to_expiry_secs: DAY, value: 52_166_761_235 },
                CurvePoint { max_time_to_expiry_secs: 3 * DAY, value: 90_226_787_871 },
                CurvePoint { max_time_to_expiry_secs: 7 * DAY, value: 137_432_041_436 },
                CurvePoint { max_time_to_expiry_secs: 14 * DAY, value: 193_395_770_533 },
                CurvePoint { max_time_to_expiry_secs: 28 * DAY, value: 281_783_870_466 },
            ],
        }
    }
}

impl NakedMarginParams {
    /// Value of the first bucket whose bound is at or above `time_to_expiry`.
    pub fn curve_value(&self, time_to_expiry: u64) -> Result<FixedPoint, MarginError> {
        let point = self
            .curve
            .iter()
            .find(|p| time_to_expiry <= p.max_time_to_expiry_secs)
            .ok_or(MarginError::TimeOutOfRange(time_to_expiry))?;
        Ok(FixedPoint::from_scaled(point.value, CURVE_DECIMALS)?)
    }

    /// Longest time to expiry the curve covers.
    pub fn horizon(&self) -> u64 {
        self.curve
            .last()
            .map(|p| p.max_time_to_expiry_secs)
            .unwrap_or(0)
    }

    /// Collateral per short token, projected to `collateral_decimals`
    /// (rounded up). `strike` and `spot` share the strike asset's units.
    pub fn naked_margin_per_unit(
        &self,
        strike: FixedPoint,
        spot: FixedPoint,
        time_to_expiry: u64,
        is_put: bool,
        collateral_decimals: u32,
    ) -> Result<u128, MarginError> {
        let value = self.per_unit_value(strike, spot, time_to_expiry, is_put)?;
        Ok(value.to_scaled(collateral_decimals, true)?)
    }

    pub fn per_unit_value(
        &self,
        strike: FixedPoint,
        spot: FixedPoint,
        time_to_expiry: u64,
        is_put: bool,
    ) -> Result<FixedPoint, MarginError> {
        let c = self.curve_value(time_to_expiry)?;
        let three = FixedPoint::new(dec!(3));
        let four = FixedPoint::new(dec!(4));

        let value = if is_put {
            let shocked_spot = spot.mul(FixedPoint::new(dec!(0.75)))?;
            if strike.is_greater_or_equal(shocked_spot) {
                c.mul(shocked_spot)?.add(strike.sub(shocked_spot)?)?
            } else {
                c.mul(strike)?
            }
        } else {
            let shocked_strike = strike.mul(four)?.div(three)?;
            if spot.is_greater_than(shocked_strike) {
                let uncovered = FixedPoint::ONE.sub(c)?.mul(four)?.mul(strike)?;
                FixedPoint::ONE.sub(uncovered.div(three.mul(spot)?)?)?
            } else {
                c
            }
        };
        Ok(value)
    }
}
