//! Required and excess collateral.

use tracing::debug;

use super::core::{MarginCalculator, VaultDetails};
use super::results::{CalculatorError, ExcessCollateral};
use crate::conversion::{convert_live, live_price};
use crate::fixed_point::FixedPoint;
use crate::margin::{call_spread_requirement, put_spread_requirement, MarginKind};
use crate::settlement::expired_vault_proceeds;
use crate::types::{AssetId, OptionDescriptor, Timestamp, BASE_DECIMALS};
use crate::vault::Vault;

impl<'a> MarginCalculator<'a> {
    /// Collateral the vault holds beyond (or short of) its requirement.
    ///
    /// The amount is projected to the collateral asset's decimals, rounding
    /// up when the vault is in excess and truncating on a deficit.
    pub fn excess_collateral(
        &self,
        vault: &Vault,
        kind: MarginKind,
        now: Timestamp,
    ) -> Result<ExcessCollateral, CalculatorError> {
        let details = self.resolve(vault)?;
        let Some(governing) = details.governing() else {
            return project_excess(&details, FixedPoint::ZERO);
        };

        let required = self.required_collateral(&details, kind, now)?;
        let result = project_excess(&details, required)?;
        debug!(
            otoken = %governing.otoken,
            ?kind,
            required = %required,
            collateral = %details.collateral_amount,
            is_excess = result.is_excess,
            amount = result.amount,
            "excess collateral"
        );
        Ok(result)
    }

    /// Required collateral in collateral asset units. After expiry this is
    /// the net settlement obligation, which may be negative.
    pub fn margin_required(
        &self,
        vault: &Vault,
        kind: MarginKind,
        now: Timestamp,
    ) -> Result<FixedPoint, CalculatorError> {
        let details = self.resolve(vault)?;
        self.required_collateral(&details, kind, now)
    }

    /// Naked requirement for `short_amount` of `otoken` at a given spot price,
    /// in collateral external units (rounded up). Spot is 8 decimals.
    pub fn naked_margin_required(
        &self,
        otoken: AssetId,
        short_amount: u128,
        spot: u128,
        now: Timestamp,
    ) -> Result<u128, CalculatorError> {
        let option = self.describe(otoken)?;
        let vault = Vault::new()
            .with_short(otoken, short_amount)
            .with_collateral(option.collateral, 0);
        let details = self.resolve(&vault)?;
        let spot = FixedPoint::from_scaled(spot, BASE_DECIMALS)?;
        let required = self.naked_requirement(&details, spot, now)?;
        Ok(required.to_scaled(option.collateral_decimals, true)?)
    }

    pub(super) fn required_collateral(
        &self,
        details: &VaultDetails,
        kind: MarginKind,
        now: Timestamp,
    ) -> Result<FixedPoint, CalculatorError> {
        let Some(governing) = details.governing() else {
            return Ok(FixedPoint::ZERO);
        };

        if details.is_expired(now) {
            debug!(otoken = %governing.otoken, expiry = %governing.expiry, "expired vault, using settlement value");
            let short = details.short.as_ref().map(|o| (o, details.short_raw));
            let long = details.long.as_ref().map(|o| (o, details.long_raw));
            return Ok(expired_vault_proceeds(self.oracle, short, long)?);
        }

        match kind {
            MarginKind::MaxLoss => self.spread_requirement(details),
            MarginKind::Naked => {
                let spot = live_price(self.oracle, governing.underlying)?;
                self.naked_requirement(details, spot, now)
            }
        }
    }

    fn spread_requirement(&self, details: &VaultDetails) -> Result<FixedPoint, CalculatorError> {
        let Some(governing) = details.governing() else {
            return Ok(FixedPoint::ZERO);
        };
        let short_strike = strike_or_zero(details.short.as_ref())?;
        let long_strike = strike_or_zero(details.long.as_ref())?;

        let (required, denominated_in) = if governing.is_put {
            let r = put_spread_requirement(details.short_amount, short_strike, details.long_amount, long_strike)?;
            (r, governing.strike_asset)
        } else {
            let r = call_spread_requirement(details.short_amount, short_strike, details.long_amount, long_strike)?;
            (r, governing.underlying)
        };

        debug!(otoken = %governing.otoken, is_put = governing.is_put, required = %required, "max loss requirement");
        Ok(convert_live(self.oracle, required, denominated_in, governing.collateral)?)
    }

    /// Naked requirement of the short leg with `spot` as the underlying price
    /// and `now` as the clock. Zero without a short.
    pub(super) fn naked_requirement(
        &self,
        details: &VaultDetails,
        spot: FixedPoint,
        now: Timestamp,
    ) -> Result<FixedPoint, CalculatorError> {
        let Some(short) = details.short.as_ref() else {
            return Ok(FixedPoint::ZERO);
        };
        let time_to_expiry = now.seconds_until(short.expiry);
        let per_unit = self.config.naked_margin.naked_margin_per_unit(
            short.strike()?,
            spot,
            time_to_expiry,
            short.is_put,
            short.collateral_decimals,
        )?;
        let per_unit = FixedPoint::from_scaled(per_unit, short.collateral_decimals)?;

        debug!(otoken = %short.otoken, time_to_expiry, spot = %spot, per_unit = %per_unit, "naked requirement");
        Ok(per_unit.mul(details.short_amount)?)
    }
}

/// Collateral minus `required`, projected to the governing leg's collateral
/// decimals. An empty vault reports its raw collateral as excess.
pub(super) fn project_excess(
    details: &VaultDetails,
    required: FixedPoint,
) -> Result<ExcessCollateral, CalculatorError> {
    let Some(governing) = details.governing() else {
        return Ok(ExcessCollateral {
            amount: details.collateral_raw,
            is_excess: true,
        });
    };
    let excess = details.collateral_amount.sub(required)?;
    let is_excess = excess.is_greater_or_equal(FixedPoint::ZERO);
    let amount = excess
        .abs()
        .to_scaled(governing.collateral_decimals, is_excess)?;
    Ok(ExcessCollateral { amount, is_excess })
}

fn strike_or_zero(option: Option<&OptionDescriptor>) -> Result<FixedPoint, CalculatorError> {
    match option {
        Some(o) => Ok(o.strike()?),
        None => Ok(FixedPoint::ZERO),
    }
}
