// 8.0.2: result types and errors for calculator queries.

use crate::fixed_point::MathError;
use crate::liquidation::LiquidationError;
use crate::margin::MarginError;
use crate::price_feed::PriceError;
use crate::types::{AssetId, Timestamp};
use crate::vault::VaultError;

/// Collateral above (excess) or below (deficit) the requirement, in the
/// collateral asset's external decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcessCollateral {
    pub amount: u128,
    pub is_excess: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationCheck {
    pub is_undercollateralized: bool,
    /// Collateral paid per whole short option at the current auction price.
    /// Zero when the vault is not liquidatable.
    pub sale_price_per_option: u128,
    /// Dust limit of the vault's collateral asset, zero when none is set.
    pub collateral_dust: u128,
}

/// Broad failure classes. Every variant aborts the whole query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    PriceUnavailable,
    DomainRange,
    Ordering,
    Arithmetic,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    #[error("Option token {0} not registered")]
    UnknownOptionToken(AssetId),

    #[error("No decimals registered for {0}")]
    UnknownAsset(AssetId),

    #[error("Option {otoken} has not expired (expiry {expiry})")]
    NotExpired { otoken: AssetId, expiry: Timestamp },

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    #[error("Margin error: {0}")]
    Margin(#[from] MarginError),

    #[error("Liquidation error: {0}")]
    Liquidation(#[from] LiquidationError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl CalculatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CalculatorError::UnknownOptionToken(_)
            | CalculatorError::UnknownAsset(_)
            | CalculatorError::Vault(_) => ErrorCategory::Validation,
            CalculatorError::NotExpired { .. } => ErrorCategory::DomainRange,
            CalculatorError::Price(PriceError::Math(_)) => ErrorCategory::Arithmetic,
            CalculatorError::Price(_) => ErrorCategory::PriceUnavailable,
            CalculatorError::Margin(MarginError::Math(_)) => ErrorCategory::Arithmetic,
            CalculatorError::Margin(_) => ErrorCategory::DomainRange,
            CalculatorError::Liquidation(e) => match e {
                LiquidationError::StaleRound { .. } | LiquidationError::OutOfOrderCheck { .. } => {
                    ErrorCategory::Ordering
                }
                LiquidationError::NotUndercollateralized | LiquidationError::VaultExpired { .. } => {
                    ErrorCategory::DomainRange
                }
                LiquidationError::NoShortPosition | LiquidationError::NoDustLimitConfigured(_) => {
                    ErrorCategory::Validation
                }
                LiquidationError::Math(_) => ErrorCategory::Arithmetic,
            },
            CalculatorError::Math(_) => ErrorCategory::Arithmetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoundId;

    #[test]
    fn categories_follow_taxonomy() {
        let cases = [
            (CalculatorError::from(VaultError::InvalidShape), ErrorCategory::Validation),
            (
                CalculatorError::from(PriceError::NotFinalized { asset: AssetId(1), expiry: Timestamp(5) }),
                ErrorCategory::PriceUnavailable,
            ),
            (
                CalculatorError::from(PriceError::RoundNotFound { asset: AssetId(1), round: RoundId(3) }),
                ErrorCategory::PriceUnavailable,
            ),
            (CalculatorError::from(MarginError::TimeOutOfRange(9)), ErrorCategory::DomainRange),
            (CalculatorError::from(MarginError::InvalidMarginKind(4)), ErrorCategory::DomainRange),
            (
                CalculatorError::from(LiquidationError::OutOfOrderCheck {
                    round_start: Timestamp(1),
                    last_checked: Timestamp(2),
                }),
                ErrorCategory::Ordering,
            ),
            (CalculatorError::from(MathError::DivisionByZero), ErrorCategory::Arithmetic),
            (CalculatorError::from(PriceError::Math(MathError::Overflow)), ErrorCategory::Arithmetic),
        ];
        for (err, category) in cases {
            assert_eq!(err.category(), category, "{err}");
        }
    }
}
