// 7.0 config.rs: all calculator settings in one place. liquidation auction and
// the naked margin curve. defaults are the production constants.

use serde::{Deserialize, Serialize};

use crate::fixed_point::MAX_DECIMALS;
use crate::liquidation::LiquidationParams;
use crate::naked_margin::NakedMarginParams;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub liquidation: LiquidationParams,
    pub naked_margin: NakedMarginParams,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Naked margin curve is empty")]
    EmptyCurve,

    #[error("Naked margin curve buckets must be strictly ascending")]
    UnorderedCurve,

    #[error("Auction length must be positive")]
    ZeroAuctionLength,

    #[error("Deviation decimals {0} exceed supported precision")]
    DeviationDecimals(u32),
}

impl CalculatorConfig {
    /// Parse a JSON document. Missing sections fall back to defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: CalculatorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let curve = &self.naked_margin.curve;
        if curve.is_empty() {
            return Err(ConfigError::EmptyCurve);
        }
        if curve
            .windows(2)
            .any(|w| w[0].max_time_to_expiry_secs >= w[1].max_time_to_expiry_secs)
        {
            return Err(ConfigError::UnorderedCurve);
        }
        if self.liquidation.auction_length_secs == 0 {
            return Err(ConfigError::ZeroAuctionLength);
        }
        if self.liquidation.deviation_decimals > MAX_DECIMALS {
            return Err(ConfigError::DeviationDecimals(self.liquidation.deviation_decimals));
        }
        Ok(())
    }
}
