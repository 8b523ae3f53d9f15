// 8.0: margin calculator. answers excess collateral, expiry payout, historical
// solvency, liquidation price, and dust queries for a vault snapshot.
// stateless: prices and token metadata come from injected read-only services.

mod collateral;
mod core;
mod expiry;
mod liquidations;
mod results;

pub use core::MarginCalculator;
pub use results::{CalculatorError, ErrorCategory, ExcessCollateral, LiquidationCheck};
