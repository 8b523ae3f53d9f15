// 9.1 settlement.rs: cash value of expired options and net vault proceeds.
// only finalized expiry prices are used. an unfinalized price aborts the call.

use crate::conversion::convert_expiry;
use crate::fixed_point::FixedPoint;
use crate::price_feed::{PriceError, PriceOracle};
use crate::types::{OptionDescriptor, BASE_DECIMALS};

/// Intrinsic value per option in strike units.
pub fn cash_value(strike: FixedPoint, underlying_in_strike: FixedPoint, is_put: bool) -> Result<FixedPoint, PriceError> {
    let payoff = if is_put {
        strike.sub(underlying_in_strike)?
    } else {
        underlying_in_strike.sub(strike)?
    };
    Ok(payoff.max(FixedPoint::ZERO))
}

/// Cash value of one expired option, priced with the finalized expiry prices.
pub fn expired_cash_value(oracle: &dyn PriceOracle, option: &OptionDescriptor) -> Result<FixedPoint, PriceError> {
    let underlying_in_strike = convert_expiry(
        oracle,
        FixedPoint::ONE,
        option.underlying,
        option.strike_asset,
        option.expiry,
    )?;
    cash_value(option.strike()?, underlying_in_strike, option.is_put)
}

/// Collateral owed per expired option, in collateral asset units.
pub fn expired_payout(oracle: &dyn PriceOracle, option: &OptionDescriptor) -> Result<FixedPoint, PriceError> {
    let cash = expired_cash_value(oracle, option)?;
    convert_expiry(oracle, cash, option.strike_asset, option.collateral, option.expiry)
}

// 9.1.1: net obligation of an expired vault in collateral units.
// positive = the vault owes that much, negative = the long leg pays in more
// than the short leg owes.
pub fn expired_vault_proceeds(
    oracle: &dyn PriceOracle,
    short: Option<(&OptionDescriptor, u128)>,
    long: Option<(&OptionDescriptor, u128)>,
) -> Result<FixedPoint, PriceError> {
    let Some(governing) = short.or(long).map(|(option, _)| option) else {
        return Ok(FixedPoint::ZERO);
    };

    let short_owed = leg_value(oracle, short)?;
    let long_owed = leg_value(oracle, long)?;
    let net_in_strike = short_owed.sub(long_owed)?;

    convert_expiry(
        oracle,
        net_in_strike,
        governing.strike_asset,
        governing.collateral,
        governing.expiry,
    )
}

fn leg_value(oracle: &dyn PriceOracle, leg: Option<(&OptionDescriptor, u128)>) -> Result<FixedPoint, PriceError> {
    match leg {
        Some((option, amount)) => {
            let amount = FixedPoint::from_scaled(amount, BASE_DECIMALS)?;
            Ok(expired_cash_value(oracle, option)?.mul(amount)?)
        }
        None => Ok(FixedPoint::ZERO),
    }
}
