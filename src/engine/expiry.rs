//! Redemption rate of expired option tokens.

use tracing::debug;

use super::core::MarginCalculator;
use super::results::CalculatorError;
use crate::settlement::expired_payout;
use crate::types::{AssetId, Timestamp};

impl<'a> MarginCalculator<'a> {
    /// Collateral redeemable for one whole expired option (1e8 base units),
    /// in the collateral asset's external decimals, truncated.
    pub fn expired_payout_rate(&self, otoken: AssetId, now: Timestamp) -> Result<u128, CalculatorError> {
        let option = self.describe(otoken)?;
        if !option.is_expired(now) {
            return Err(CalculatorError::NotExpired {
                otoken,
                expiry: option.expiry,
            });
        }

        let payout = expired_payout(self.oracle, &option)?;
        let rate = payout.to_scaled(option.collateral_decimals, false)?;
        debug!(%otoken, payout = %payout, rate, "expired payout rate");
        Ok(rate)
    }
}
