// option-margin-core: collateral, settlement and liquidation math for option vaults.
// a vault holds at most one short option, one long option, and one collateral asset.
// all computation is deterministic; "now" and every price are inputs.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: AssetId, RoundId, Timestamp, OptionDescriptor
//   2.x  fixed_point.rs: decimal arithmetic, scaling to and from asset decimals
//   3.x  vault.rs: vault snapshot, shape and marginability checks
//   4.x  margin.rs: max-loss spread requirement, margin kind selector
//   4.2  naked_margin.rs: time-bucketed naked margin curve
//   5.x  conversion.rs: live and expiry price conversion between assets
//   6.x  liquidation.rs: auction pricing, round ordering, dust rule
//   7.x  config.rs: auction and curve parameters, json loading
//   8.x  engine/: the calculator: excess, payout, liquidation queries
//   9.x  price_feed.rs: oracle and registry interfaces (mocked)
//   9.1  settlement.rs: expired option cash value and vault proceeds

// arithmetic and data
pub mod fixed_point;
pub mod types;
pub mod vault;

// margin and settlement math
pub mod conversion;
pub mod liquidation;
pub mod margin;
pub mod naked_margin;
pub mod settlement;

// calculator and its inputs
pub mod config;
pub mod engine;
pub mod price_feed;

// re exports for convenience
pub use config::{CalculatorConfig, ConfigError};
pub use engine::*;
pub use fixed_point::{FixedPoint, MathError};
pub use liquidation::{LiquidationError, LiquidationParams};
pub use margin::{MarginError, MarginKind};
pub use naked_margin::{CurvePoint, NakedMarginParams};
pub use price_feed::{
    AssetRegistry, ExpiryPrice, HistoricalPrice, MockAssetRegistry, MockOptionRegistry, MockOracle,
    OptionRegistry, PriceError, PriceOracle,
};
pub use types::*;
pub use vault::{Leg, Vault, VaultError};
