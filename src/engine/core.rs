// 8.0 engine/core.rs: the calculator. holds config and the injected read-only
// services. no mutable state; every query is a pure function of its inputs.

use super::results::CalculatorError;
use crate::config::{CalculatorConfig, ConfigError};
use crate::fixed_point::FixedPoint;
use crate::price_feed::{AssetRegistry, OptionRegistry, PriceOracle};
use crate::types::{AssetId, OptionDescriptor, Timestamp, BASE_DECIMALS};
use crate::vault::{validate_vault, Vault};

/** 8.1: margin calculator. borrows its collaborators for the lifetime of the queries */
pub struct MarginCalculator<'a> {
    pub(super) config: CalculatorConfig,
    pub(super) oracle: &'a dyn PriceOracle,
    pub(super) options: &'a dyn OptionRegistry,
    pub(super) assets: &'a dyn AssetRegistry,
}

/// A validated vault with every leg resolved and lifted to fixed point.
#[derive(Debug, Clone)]
pub(super) struct VaultDetails {
    pub short: Option<OptionDescriptor>,
    pub long: Option<OptionDescriptor>,
    pub short_raw: u128,
    pub long_raw: u128,
    pub collateral_raw: u128,
    pub short_amount: FixedPoint,
    pub long_amount: FixedPoint,
    pub collateral_amount: FixedPoint,
}

impl VaultDetails {
    /// Short leg when present, otherwise the long leg.
    pub fn governing(&self) -> Option<&OptionDescriptor> {
        self.short.as_ref().or(self.long.as_ref())
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.governing().is_some_and(|o| o.is_expired(now))
    }
}

impl<'a> MarginCalculator<'a> {
    /// Rejects a config that fails `CalculatorConfig::validate`.
    pub fn new(
        config: CalculatorConfig,
        oracle: &'a dyn PriceOracle,
        options: &'a dyn OptionRegistry,
        assets: &'a dyn AssetRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            oracle,
            options,
            assets,
        })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Look up an option token's terms and its collateral decimals.
    pub fn describe(&self, otoken: AssetId) -> Result<OptionDescriptor, CalculatorError> {
        let terms = self
            .options
            .option_terms(otoken)
            .ok_or(CalculatorError::UnknownOptionToken(otoken))?;
        let decimals = self.decimals(terms.collateral)?;
        Ok(OptionDescriptor::from_terms(otoken, terms, decimals))
    }

    pub(super) fn decimals(&self, asset: AssetId) -> Result<u32, CalculatorError> {
        self.assets
            .decimals(asset)
            .ok_or(CalculatorError::UnknownAsset(asset))
    }

    /// Shape check, descriptor resolution, product and collateral checks.
    pub(super) fn resolve(&self, vault: &Vault) -> Result<VaultDetails, CalculatorError> {
        vault.check_shape()?;

        let short = vault.short().map(|l| self.describe(l.asset)).transpose()?;
        let long = vault.long().map(|l| self.describe(l.asset)).transpose()?;
        validate_vault(vault, short.as_ref(), long.as_ref())?;

        let collateral_amount = match short.as_ref().or(long.as_ref()) {
            Some(option) => FixedPoint::from_scaled(vault.collateral_amount(), option.collateral_decimals)?,
            None => FixedPoint::ZERO,
        };

        Ok(VaultDetails {
            short,
            long,
            short_raw: vault.short_amount(),
            long_raw: vault.long_amount(),
            collateral_raw: vault.collateral_amount(),
            short_amount: FixedPoint::from_scaled(vault.short_amount(), BASE_DECIMALS)?,
            long_amount: FixedPoint::from_scaled(vault.long_amount(), BASE_DECIMALS)?,
            collateral_amount,
        })
    }
}
