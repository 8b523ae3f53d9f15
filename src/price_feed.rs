// Price and token metadata sources
//
// The calculator never fetches anything itself. Oracle prices, option token
// terms and asset decimals are read through the traits below, so a chain
// adapter, a backtest replay or an in-memory mock can sit behind them.
// All prices are 8 decimal integers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::fixed_point::MathError;
use crate::types::{AssetId, OptionTerms, RoundId, Timestamp};

/// Price recorded for an asset at an option expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPrice {
    pub price: u128,
    /// Only a finalized price may be used for settlement.
    pub finalized: bool,
}

/// Price of a past oracle round and the time the round started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    pub price: u128,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("No live price for {0}")]
    Unavailable(AssetId),

    #[error("Expiry price for {asset} at {expiry} is not finalized")]
    NotFinalized { asset: AssetId, expiry: Timestamp },

    #[error("Round {round:?} not found for {asset}")]
    RoundNotFound { asset: AssetId, round: RoundId },

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Oracle interface. Implement this to plug in a concrete price network.
pub trait PriceOracle {
    /// Latest live price.
    fn price(&self, asset: AssetId) -> Option<u128>;

    /// Price recorded at `expiry`, finalized or not.
    fn expiry_price(&self, asset: AssetId, expiry: Timestamp) -> Option<ExpiryPrice>;

    /// Price and start time of a historical round.
    fn historical_price(&self, asset: AssetId, round: RoundId) -> Option<HistoricalPrice>;

    /// Minimum residual collateral for an asset, if one is registered.
    fn dust_limit(&self, asset: AssetId) -> Option<u128>;
}

/// Option token registry. Terms are immutable for a token's lifetime.
pub trait OptionRegistry {
    fn option_terms(&self, otoken: AssetId) -> Option<OptionTerms>;
}

/// Asset metadata registry.
pub trait AssetRegistry {
    fn decimals(&self, asset: AssetId) -> Option<u32>;
}

/// In-memory oracle for testing and simulation
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    live: HashMap<AssetId, u128>,
    expiry: HashMap<(AssetId, Timestamp), ExpiryPrice>,
    rounds: HashMap<(AssetId, RoundId), HistoricalPrice>,
    dust: HashMap<AssetId, u128>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&mut self, asset: AssetId, price: u128) {
        self.live.insert(asset, price);
    }

    pub fn set_expiry_price(&mut self, asset: AssetId, expiry: Timestamp, price: u128, finalized: bool) {
        self.expiry.insert((asset, expiry), ExpiryPrice { price, finalized });
    }

    pub fn set_round(&mut self, asset: AssetId, round: RoundId, price: u128, timestamp: Timestamp) {
        self.rounds
            .insert((asset, round), HistoricalPrice { price, timestamp });
    }

    pub fn set_dust_limit(&mut self, asset: AssetId, limit: u128) {
        self.dust.insert(asset, limit);
    }
}

impl PriceOracle for MockOracle {
    fn price(&self, asset: AssetId) -> Option<u128> {
        self.live.get(&asset).copied()
    }

    fn expiry_price(&self, asset: AssetId, expiry: Timestamp) -> Option<ExpiryPrice> {
        self.expiry.get(&(asset, expiry)).copied()
    }

    fn historical_price(&self, asset: AssetId, round: RoundId) -> Option<HistoricalPrice> {
        self.rounds.get(&(asset, round)).copied()
    }

    fn dust_limit(&self, asset: AssetId) -> Option<u128> {
        self.dust.get(&asset).copied()
    }
}

/// In-memory option token registry
#[derive(Debug, Clone, Default)]
pub struct MockOptionRegistry {
    terms: HashMap<AssetId, OptionTerms>,
}

impl MockOptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, otoken: AssetId, terms: OptionTerms) {
        self.terms.insert(otoken, terms);
    }
}

impl OptionRegistry for MockOptionRegistry {
    fn option_terms(&self, otoken: AssetId) -> Option<OptionTerms> {
        self.terms.get(&otoken).copied()
    }
}

/// In-memory asset decimals registry
#[derive(Debug, Clone, Default)]
pub struct MockAssetRegistry {
    decimals: HashMap<AssetId, u32>,
}

impl MockAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, asset: AssetId, decimals: u32) {
        self.decimals.insert(asset, decimals);
    }
}

impl AssetRegistry for MockAssetRegistry {
    fn decimals(&self, asset: AssetId) -> Option<u32> {
        self.decimals.get(&asset).copied()
    }
}
