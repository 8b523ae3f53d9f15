//! Vault snapshot and structural validation.
//!
//! A vault is read-only input owned by the controller: at most one short
//! option, at most one long option, at most one collateral asset. Shape
//! checks run on the raw sequences; product checks run on the resolved
//! option descriptors before any margin math.

use serde::{Deserialize, Serialize};

use crate::types::{AssetId, OptionDescriptor};

/// One asset and amount inside a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub asset: AssetId,
    pub amount: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub short_otokens: Vec<AssetId>,
    pub short_amounts: Vec<u128>,
    pub long_otokens: Vec<AssetId>,
    pub long_amounts: Vec<u128>,
    pub collateral_assets: Vec<AssetId>,
    pub collateral_amounts: Vec<u128>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("Vault holds more than one asset per leg or mismatched amounts")]
    InvalidShape,

    #[error("Long option cannot be used to margin the short")]
    UnmarginableLong,

    #[error("Collateral asset does not match the option collateral")]
    UnmarginableCollateral,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_short(mut self, otoken: AssetId, amount: u128) -> Self {
        self.short_otokens.push(otoken);
        self.short_amounts.push(amount);
        self
    }

    pub fn with_long(mut self, otoken: AssetId, amount: u128) -> Self {
        self.long_otokens.push(otoken);
        self.long_amounts.push(amount);
        self
    }

    pub fn with_collateral(mut self, asset: AssetId, amount: u128) -> Self {
        self.collateral_assets.push(asset);
        self.collateral_amounts.push(amount);
        self
    }

    /// Reject anything other than zero or one entry per leg with matching lengths.
    pub fn check_shape(&self) -> Result<(), VaultError> {
        let legs = [
            (self.short_otokens.len(), self.short_amounts.len()),
            (self.long_otokens.len(), self.long_amounts.len()),
            (self.collateral_assets.len(), self.collateral_amounts.len()),
        ];
        if legs.iter().any(|&(assets, amounts)| assets > 1 || assets != amounts) {
            return Err(VaultError::InvalidShape);
        }
        Ok(())
    }

    pub fn short(&self) -> Option<Leg> {
        leg(&self.short_otokens, &self.short_amounts)
    }

    pub fn long(&self) -> Option<Leg> {
        leg(&self.long_otokens, &self.long_amounts)
    }

    pub fn collateral(&self) -> Option<Leg> {
        leg(&self.collateral_assets, &self.collateral_amounts)
    }

    pub fn short_amount(&self) -> u128 {
        self.short().map(|l| l.amount).unwrap_or(0)
    }

    pub fn long_amount(&self) -> u128 {
        self.long().map(|l| l.amount).unwrap_or(0)
    }

    pub fn collateral_amount(&self) -> u128 {
        self.collateral().map(|l| l.amount).unwrap_or(0)
    }
}

fn leg(assets: &[AssetId], amounts: &[u128]) -> Option<Leg> {
    match (assets.first(), amounts.first()) {
        (Some(&asset), Some(&amount)) => Some(Leg { asset, amount }),
        _ => None,
    }
}

/// Full structural validation against the resolved option descriptors.
pub fn validate_vault(
    vault: &Vault,
    short: Option<&OptionDescriptor>,
    long: Option<&OptionDescriptor>,
) -> Result<(), VaultError> {
    vault.check_shape()?;

    if let (Some(s), Some(l)) = (short, long) {
        if !s.is_same_product(l) || s.otoken == l.otoken {
            return Err(VaultError::UnmarginableLong);
        }
    }

    if let Some(collateral) = vault.collateral() {
        // short leg decides the collateral asset when both legs exist
        if let Some(option) = short.or(long) {
            if collateral.asset != option.collateral {
                return Err(VaultError::UnmarginableCollateral);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    const USDC: AssetId = AssetId(1);
    const WETH: AssetId = AssetId(2);

    fn put(otoken: u32, strike: u128) -> OptionDescriptor {
        OptionDescriptor {
            otoken: AssetId(otoken),
            underlying: WETH,
            strike_asset: USDC,
            collateral: USDC,
            strike_price: strike,
            expiry: Timestamp(1_000),
            is_put: true,
            collateral_decimals: 6,
        }
    }

    #[test]
    fn empty_vault_is_valid() {
        assert_eq!(validate_vault(&Vault::new(), None, None), Ok(()));
    }

    #[test]
    fn two_shorts_rejected() {
        let vault = Vault::new().with_short(AssetId(10), 1).with_short(AssetId(11), 1);
        assert_eq!(vault.check_shape(), Err(VaultError::InvalidShape));
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let mut vault = Vault::new().with_collateral(USDC, 100);
        vault.collateral_amounts.push(5);
        assert_eq!(vault.check_shape(), Err(VaultError::InvalidShape));

        let mut vault = Vault::new();
        vault.long_amounts.push(1);
        assert_eq!(vault.check_shape(), Err(VaultError::InvalidShape));
    }

    #[test]
    fn matching_spread_is_valid() {
        let short = put(10, 100_00000000);
        let long = put(11, 90_00000000);
        let vault = Vault::new()
            .with_short(short.otoken, 1)
            .with_long(long.otoken, 1)
            .with_collateral(USDC, 10_000_000);
        assert_eq!(validate_vault(&vault, Some(&short), Some(&long)), Ok(()));
    }

    #[test]
    fn same_instrument_long_rejected() {
        let short = put(10, 100_00000000);
        let vault = Vault::new().with_short(short.otoken, 1).with_long(short.otoken, 1);
        assert_eq!(
            validate_vault(&vault, Some(&short), Some(&short)),
            Err(VaultError::UnmarginableLong)
        );
    }

    #[test]
    fn long_with_other_expiry_rejected() {
        let short = put(10, 100_00000000);
        let mut long = put(11, 90_00000000);
        long.expiry = Timestamp(2_000);
        let vault = Vault::new().with_short(short.otoken, 1).with_long(long.otoken, 1);
        assert_eq!(
            validate_vault(&vault, Some(&short), Some(&long)),
            Err(VaultError::UnmarginableLong)
        );
    }

    #[test]
    fn wrong_collateral_rejected() {
        let short = put(10, 100_00000000);
        let vault = Vault::new().with_short(short.otoken, 1).with_collateral(WETH, 1);
        assert_eq!(
            validate_vault(&vault, Some(&short), None),
            Err(VaultError::UnmarginableCollateral)
        );
    }

    #[test]
    fn long_only_vault_checks_long_collateral() {
        let long = put(11, 90_00000000);
        let vault = Vault::new().with_long(long.otoken, 1).with_collateral(WETH, 1);
        assert_eq!(
            validate_vault(&vault, None, Some(&long)),
            Err(VaultError::UnmarginableCollateral)
        );
    }

    #[test]
    fn leg_accessors_default_to_zero() {
        let vault = Vault::new().with_collateral(USDC, 42);
        assert_eq!(vault.short_amount(), 0);
        assert_eq!(vault.collateral_amount(), 42);
        assert!(vault.long().is_none());
    }
}
