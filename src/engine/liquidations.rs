//! Historical solvency and partial liquidation pricing.

use tracing::{debug, warn};

use super::collateral::project_excess;
use super::core::{MarginCalculator, VaultDetails};
use super::results::{CalculatorError, ExcessCollateral, LiquidationCheck};
use crate::fixed_point::FixedPoint;
use crate::liquidation::{
    auction_starting_price, check_round_order, exceeds_dust, full_backing_price, LiquidationError,
};
use crate::price_feed::{HistoricalPrice, PriceError};
use crate::types::{OptionDescriptor, RoundId, Timestamp, BASE_DECIMALS};
use crate::vault::Vault;

impl<'a> MarginCalculator<'a> {
    /// Naked margin state of the vault at a recorded `(price, timestamp)`
    /// snapshot instead of the live oracle. Price is 8 decimals.
    pub fn historical_excess_naked_margin(
        &self,
        vault: &Vault,
        price: u128,
        timestamp: Timestamp,
    ) -> Result<ExcessCollateral, CalculatorError> {
        let details = self.resolve(vault)?;
        let price = FixedPoint::from_scaled(price, BASE_DECIMALS)?;
        self.historical_state(&details, price, timestamp)
    }

    /// Collateral a liquidator pays for `amount` short options (8 decimals)
    /// using round `round` as the snapshot. Result is in the collateral
    /// asset's external decimals, truncated.
    pub fn liquidation_sale_price(
        &self,
        vault: &Vault,
        amount: u128,
        round: RoundId,
        last_checked: Timestamp,
        now: Timestamp,
    ) -> Result<u128, CalculatorError> {
        let details = self.resolve(vault)?;
        let Some(short) = details.short.as_ref() else {
            return Err(LiquidationError::NoShortPosition.into());
        };
        let snapshot = self.snapshot(short, round, last_checked, now)?;

        let Some(per_option) = self.auction_quote(&details, short, &snapshot, now)? else {
            warn!(otoken = %short.otoken, round = round.0, "liquidation rejected, vault solvent at snapshot");
            return Err(LiquidationError::NotUndercollateralized.into());
        };

        let amount = FixedPoint::from_scaled(amount, BASE_DECIMALS)?;
        let total = per_option.mul(amount)?;
        debug!(otoken = %short.otoken, per_option = %per_option, amount = %amount, total = %total, "liquidation sale price");
        Ok(total.to_scaled(short.collateral_decimals, false)?)
    }

    /// Non-failing variant of the liquidation check: a solvent vault, or one
    /// without a short, reports `is_undercollateralized = false`.
    pub fn is_liquidatable(
        &self,
        vault: &Vault,
        round: RoundId,
        last_checked: Timestamp,
        now: Timestamp,
    ) -> Result<LiquidationCheck, CalculatorError> {
        let details = self.resolve(vault)?;
        let collateral_dust = vault
            .collateral()
            .and_then(|c| self.oracle.dust_limit(c.asset))
            .unwrap_or(0);

        let not_liquidatable = LiquidationCheck {
            is_undercollateralized: false,
            sale_price_per_option: 0,
            collateral_dust,
        };
        let Some(short) = details.short.as_ref() else {
            return Ok(not_liquidatable);
        };
        let snapshot = self.snapshot(short, round, last_checked, now)?;

        match self.auction_quote(&details, short, &snapshot, now)? {
            Some(per_option) => Ok(LiquidationCheck {
                is_undercollateralized: true,
                sale_price_per_option: per_option.to_scaled(short.collateral_decimals, false)?,
                collateral_dust,
            }),
            None => Ok(not_liquidatable),
        }
    }

    /// True when the vault holds no collateral or its collateral is strictly
    /// above the asset's dust limit.
    pub fn verify_dust_limit(&self, vault: &Vault) -> Result<bool, CalculatorError> {
        vault.check_shape()?;
        let Some(collateral) = vault.collateral().filter(|c| c.amount > 0) else {
            return Ok(true);
        };
        let limit = self
            .oracle
            .dust_limit(collateral.asset)
            .ok_or(LiquidationError::NoDustLimitConfigured(collateral.asset))?;

        let ok = exceeds_dust(collateral.amount, limit);
        debug!(asset = %collateral.asset, amount = collateral.amount, limit, ok, "dust check");
        Ok(ok)
    }

    fn historical_state(
        &self,
        details: &VaultDetails,
        price: FixedPoint,
        timestamp: Timestamp,
    ) -> Result<ExcessCollateral, CalculatorError> {
        if let Some(short) = details.short.as_ref() {
            if short.is_expired(timestamp) {
                return Err(LiquidationError::VaultExpired {
                    expiry: short.expiry,
                    snapshot: timestamp,
                }
                .into());
            }
        }
        let required = self.naked_requirement(details, price, timestamp)?;
        project_excess(details, required)
    }

    /// Fetch the round for the short's underlying and enforce ordering.
    fn snapshot(
        &self,
        short: &OptionDescriptor,
        round: RoundId,
        last_checked: Timestamp,
        now: Timestamp,
    ) -> Result<HistoricalPrice, CalculatorError> {
        let snapshot = self
            .oracle
            .historical_price(short.underlying, round)
            .ok_or(PriceError::RoundNotFound {
                asset: short.underlying,
                round,
            })?;
        if let Err(e) = check_round_order(snapshot.timestamp, last_checked, now) {
            warn!(otoken = %short.otoken, round = round.0, error = %e, "liquidation round rejected");
            return Err(e.into());
        }
        Ok(snapshot)
    }

    /// Auction price per short option at `now`, or `None` when the vault is
    /// solvent at the snapshot.
    fn auction_quote(
        &self,
        details: &VaultDetails,
        short: &OptionDescriptor,
        snapshot: &HistoricalPrice,
        now: Timestamp,
    ) -> Result<Option<FixedPoint>, CalculatorError> {
        let price = FixedPoint::from_scaled(snapshot.price, BASE_DECIMALS)?;
        let state = self.historical_state(details, price, snapshot.timestamp)?;
        if state.is_excess {
            return Ok(None);
        }

        let params = &self.config.liquidation;
        let backing = full_backing_price(details.collateral_amount, details.short_amount)?;
        let deviation = params.deviation(price)?;
        let starting = auction_starting_price(short.strike()?, price, deviation, short.is_put)?;
        let elapsed = snapshot.timestamp.seconds_until(now);
        let sale = params.auction_price(starting, backing, elapsed)?;

        debug!(
            otoken = %short.otoken,
            price = %price,
            deficit = state.amount,
            starting = %starting,
            backing = %backing,
            elapsed,
            sale = %sale,
            "auction quote"
        );
        Ok(Some(sale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculatorConfig;
    use crate::margin::MarginError;
    use crate::price_feed::{MockAssetRegistry, MockOptionRegistry, MockOracle};
    use crate::types::{AssetId, OptionTerms};

    const USDC: AssetId = AssetId(1);
    const WETH: AssetId = AssetId(2);
    const PUT: AssetId = AssetId(10);
    const CALL: AssetId = AssetId(20);

    const DAY: u64 = 86_400;
    const EXPIRY: Timestamp = Timestamp(10_000_000);
    const ROUND_TS: Timestamp = Timestamp(EXPIRY.0 - DAY);
    const ROUND: RoundId = RoundId(42);
    const LAST_CHECKED: Timestamp = Timestamp(ROUND_TS.0 - 1);

    struct Fixture {
        oracle: MockOracle,
        options: MockOptionRegistry,
        assets: MockAssetRegistry,
        config: CalculatorConfig,
    }

    impl Fixture {
        fn new(round_price: u128, round_ts: Timestamp) -> Self {
            let mut oracle = MockOracle::new();
            oracle.set_round(WETH, ROUND, round_price, round_ts);
            oracle.set_dust_limit(USDC, 1_000_000);

            let mut options = MockOptionRegistry::new();
            for (otoken, is_put) in [(PUT, true), (CALL, false)] {
                options.register(
                    otoken,
                    OptionTerms {
                        collateral: if is_put { USDC } else { WETH },
                        underlying: WETH,
                        strike_asset: USDC,
                        strike_price: 2_000_00000000,
                        expiry: EXPIRY,
                        is_put,
                    },
                );
            }

            let mut assets = MockAssetRegistry::new();
            assets.register(USDC, 6);
            assets.register(WETH, 18);

            Self {
                oracle,
                options,
                assets,
                config: CalculatorConfig::default(),
            }
        }

        fn calc(&self) -> MarginCalculator<'_> {
            MarginCalculator::new(self.config.clone(), &self.oracle, &self.options, &self.assets).unwrap()
        }
    }

    fn put_vault(collateral: u128) -> Vault {
        Vault::new().with_short(PUT, 1_00000000).with_collateral(USDC, collateral)
    }

    #[test]
    fn historical_state_uses_snapshot_price() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        // c * 1350 + 650 = 720.42512766725 -> 720.425128 per option
        let state = f
            .calc()
            .historical_excess_naked_margin(&put_vault(700_000_000), 1_800_00000000, ROUND_TS)
            .unwrap();
        assert_eq!(state, ExcessCollateral { amount: 20_425_128, is_excess: false });

        let state = f
            .calc()
            .historical_excess_naked_margin(&put_vault(800_000_000), 1_800_00000000, ROUND_TS)
            .unwrap();
        assert_eq!(state, ExcessCollateral { amount: 79_574_872, is_excess: true });
    }

    #[test]
    fn historical_state_beyond_horizon_fails() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let early = Timestamp(EXPIRY.0 - 30 * DAY);
        assert_eq!(
            f.calc().historical_excess_naked_margin(&put_vault(1), 1_800_00000000, early),
            Err(CalculatorError::Margin(MarginError::TimeOutOfRange(30 * DAY)))
        );
    }

    #[test]
    fn put_sale_price_halfway_through_auction() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let now = Timestamp(ROUND_TS.0 + DAY / 2);
        // A = 200, B = 700, halfway = 450 per option; half an option = 225
        let price = f
            .calc()
            .liquidation_sale_price(&put_vault(700_000_000), 50_000_000, ROUND, LAST_CHECKED, now)
            .unwrap();
        assert_eq!(price, 225_000_000);
    }

    #[test]
    fn deviation_lowers_start_and_auction_ends_at_backing() {
        let mut f = Fixture::new(1_800_00000000, ROUND_TS);
        f.config.liquidation.deviation_factor = 5_000_000; // 5% of 1800 = 90

        let early = Timestamp(ROUND_TS.0 + 864);
        // A = 110, climb (700 - 110) / 100 = 5.9
        let price = f
            .calc()
            .liquidation_sale_price(&put_vault(700_000_000), 1_00000000, ROUND, LAST_CHECKED, early)
            .unwrap();
        assert_eq!(price, 115_900_000);

        let late = Timestamp(ROUND_TS.0 + DAY + 1);
        let price = f
            .calc()
            .liquidation_sale_price(&put_vault(700_000_000), 1_00000000, ROUND, LAST_CHECKED, late)
            .unwrap();
        assert_eq!(price, 700_000_000);
    }

    #[test]
    fn call_start_clamped_to_backing() {
        let f = Fixture::new(2_500_00000000, ROUND_TS);
        // naked call requirement is c = 0.052.. WETH, collateral 0.05 WETH
        let vault = Vault::new()
            .with_short(CALL, 1_00000000)
            .with_collateral(WETH, 50_000_000_000_000_000);
        // A = 500 / 2500 = 0.2 WETH, above B = 0.05
        let price = f
            .calc()
            .liquidation_sale_price(&vault, 1_00000000, ROUND, LAST_CHECKED, Timestamp(ROUND_TS.0 + 1))
            .unwrap();
        assert_eq!(price, 50_000_000_000_000_000);
    }

    #[test]
    fn solvent_vault_cannot_be_liquidated() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let now = Timestamp(ROUND_TS.0 + 60);
        let result = f
            .calc()
            .liquidation_sale_price(&put_vault(800_000_000), 1_00000000, ROUND, LAST_CHECKED, now);
        assert_eq!(result, Err(CalculatorError::Liquidation(LiquidationError::NotUndercollateralized)));

        let check = f.calc().is_liquidatable(&put_vault(800_000_000), ROUND, LAST_CHECKED, now).unwrap();
        assert_eq!(
            check,
            LiquidationCheck {
                is_undercollateralized: false,
                sale_price_per_option: 0,
                collateral_dust: 1_000_000,
            }
        );
    }

    #[test]
    fn is_liquidatable_reports_per_option_price() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let now = Timestamp(ROUND_TS.0 + DAY / 2);
        let check = f.calc().is_liquidatable(&put_vault(700_000_000), ROUND, LAST_CHECKED, now).unwrap();
        assert_eq!(
            check,
            LiquidationCheck {
                is_undercollateralized: true,
                sale_price_per_option: 450_000_000,
                collateral_dust: 1_000_000,
            }
        );
    }

    #[test]
    fn round_ordering_enforced() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let vault = put_vault(700_000_000);

        let stale = f.calc().liquidation_sale_price(&vault, 1, ROUND, LAST_CHECKED, ROUND_TS);
        assert_eq!(
            stale,
            Err(CalculatorError::Liquidation(LiquidationError::StaleRound {
                round_start: ROUND_TS,
                now: ROUND_TS,
            }))
        );

        let now = Timestamp(ROUND_TS.0 + 10);
        let replay = f.calc().liquidation_sale_price(&vault, 1, ROUND, ROUND_TS, now);
        assert_eq!(
            replay,
            Err(CalculatorError::Liquidation(LiquidationError::OutOfOrderCheck {
                round_start: ROUND_TS,
                last_checked: ROUND_TS,
            }))
        );
    }

    #[test]
    fn missing_round_and_missing_short() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let now = Timestamp(ROUND_TS.0 + 10);
        let result = f
            .calc()
            .liquidation_sale_price(&put_vault(700_000_000), 1, RoundId(7), LAST_CHECKED, now);
        assert_eq!(
            result,
            Err(CalculatorError::Price(PriceError::RoundNotFound { asset: WETH, round: RoundId(7) }))
        );

        let no_short = Vault::new().with_collateral(USDC, 5);
        assert_eq!(
            f.calc().liquidation_sale_price(&no_short, 1, ROUND, LAST_CHECKED, now),
            Err(CalculatorError::Liquidation(LiquidationError::NoShortPosition))
        );
        assert!(!f.calc().is_liquidatable(&no_short, ROUND, LAST_CHECKED, now).unwrap().is_undercollateralized);
    }

    #[test]
    fn snapshot_at_expiry_rejected() {
        let f = Fixture::new(1_800_00000000, EXPIRY);
        let now = Timestamp(EXPIRY.0 + 10);
        let result = f
            .calc()
            .liquidation_sale_price(&put_vault(700_000_000), 1, ROUND, LAST_CHECKED, now);
        assert_eq!(
            result,
            Err(CalculatorError::Liquidation(LiquidationError::VaultExpired {
                expiry: EXPIRY,
                snapshot: EXPIRY,
            }))
        );
    }

    #[test]
    fn dust_limit_checks() {
        let f = Fixture::new(1_800_00000000, ROUND_TS);
        let calc = f.calc();

        assert!(calc.verify_dust_limit(&Vault::new()).unwrap());
        assert!(calc.verify_dust_limit(&Vault::new().with_collateral(USDC, 0)).unwrap());
        assert!(calc.verify_dust_limit(&Vault::new().with_collateral(USDC, 1_000_001)).unwrap());
        assert!(!calc.verify_dust_limit(&Vault::new().with_collateral(USDC, 1_000_000)).unwrap());
        assert_eq!(
            calc.verify_dust_limit(&Vault::new().with_collateral(WETH, 1)),
            Err(CalculatorError::Liquidation(LiquidationError::NoDustLimitConfigured(WETH)))
        );
    }
}
