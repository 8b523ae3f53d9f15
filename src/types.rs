// 1.0: primitives. asset ids, timestamps, option descriptors, scale constants.
// each id is a newtype so an asset can't be passed where a round id belongs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fixed_point::{FixedPoint, MathError};

/// Decimal count of oracle prices, strike prices and option token amounts.
pub const BASE_DECIMALS: u32 = 8;

/// Identity of any token: underlying, strike, collateral or an option token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Oracle round identifier for historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(pub u64);

// 1.1: unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Wall clock. The calculator never reads this itself; callers pass `now`.
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds from `self` until `later`, zero if `later` is not after `self`.
    pub fn seconds_until(&self, later: Timestamp) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

// 1.2: immutable terms of an option token, as reported by the token registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTerms {
    pub collateral: AssetId,
    pub underlying: AssetId,
    pub strike_asset: AssetId,
    /// 8 decimals.
    pub strike_price: u128,
    pub expiry: Timestamp,
    pub is_put: bool,
}

// 1.3: option terms resolved for one computation, plus collateral decimals.
// built fresh per call, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub otoken: AssetId,
    pub underlying: AssetId,
    pub strike_asset: AssetId,
    pub collateral: AssetId,
    pub strike_price: u128,
    pub expiry: Timestamp,
    pub is_put: bool,
    pub collateral_decimals: u32,
}

impl OptionDescriptor {
    pub fn from_terms(otoken: AssetId, terms: OptionTerms, collateral_decimals: u32) -> Self {
        Self {
            otoken,
            underlying: terms.underlying,
            strike_asset: terms.strike_asset,
            collateral: terms.collateral,
            strike_price: terms.strike_price,
            expiry: terms.expiry,
            is_put: terms.is_put,
            collateral_decimals,
        }
    }

    pub fn strike(&self) -> Result<FixedPoint, MathError> {
        FixedPoint::from_scaled(self.strike_price, BASE_DECIMALS)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiry
    }

    /// Same underlying, strike asset, collateral, expiry and put/call flag.
    pub fn is_same_product(&self, other: &OptionDescriptor) -> bool {
        self.underlying == other.underlying
            && self.strike_asset == other.strike_asset
            && self.collateral == other.collateral
            && self.expiry == other.expiry
            && self.is_put == other.is_put
    }
}
