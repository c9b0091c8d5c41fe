//! Operator fee policy.
//!
//! A flat cut is taken from every deposit when enabled. A grant whose net
//! value would be zero or negative is never created.

use granthub_types::{FeeConfig, GranthubError, Result};
use rust_decimal::Decimal;

/// Result of splitting a gross deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    /// Payable to the redeemer or back to the depositor.
    pub net: Decimal,
    /// Retained for the operator.
    pub fee: Decimal,
}

/// Computes the operator's cut. Configuration is fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct FeePolicy {
    config: FeeConfig,
}

impl FeePolicy {
    /// # Errors
    /// `Configuration` if the cut is negative.
    pub fn new(config: FeeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            config: FeeConfig::disabled(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.cut_enabled
    }

    /// The cut a deposit must strictly exceed (zero when disabled).
    #[must_use]
    pub fn effective_cut(&self) -> Decimal {
        if self.config.cut_enabled {
            self.config.cut_amount
        } else {
            Decimal::ZERO
        }
    }

    /// Split `gross` into `(net, fee)`.
    ///
    /// # Errors
    /// `InsufficientGrant` unless `gross` strictly exceeds the effective cut.
    pub fn apply(&self, gross: Decimal) -> Result<FeeSplit> {
        let cut = self.effective_cut();
        if gross <= cut {
            return Err(GranthubError::InsufficientGrant { gross, cut });
        }
        let net = gross.checked_sub(cut).ok_or(GranthubError::AmountOverflow)?;
        Ok(FeeSplit { net, fee: cut })
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::disabled()
    }
}
