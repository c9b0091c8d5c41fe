//! Construction-time configuration for a GrantHub ledger.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, GranthubError, InstanceId, Result, constants};

/// Operator fee settings. Fixed for the life of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Whether a cut is taken from each deposit.
    pub cut_enabled: bool,
    /// Flat cut per deposit. Ignored when disabled.
    pub cut_amount: Decimal,
}

impl FeeConfig {
    /// No fee is taken.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            cut_enabled: false,
            cut_amount: Decimal::ZERO,
        }
    }

    /// A flat cut of `amount` per deposit.
    #[must_use]
    pub fn cut(amount: Decimal) -> Self {
        Self {
            cut_enabled: true,
            cut_amount: amount,
        }
    }

    /// # Errors
    /// `Configuration` if the cut is negative.
    pub fn validate(&self) -> Result<()> {
        if self.cut_amount < Decimal::ZERO {
            return Err(GranthubError::Configuration(format!(
                "cut_amount must be >= 0, got {}",
                self.cut_amount
            )));
        }
        Ok(())
    }
}

impl Default for FeeConfig {
    /// Deployment default: fee off, cut preset to 0.01 units.
    fn default() -> Self {
        Self {
            cut_enabled: false,
            cut_amount: constants::DEFAULT_CUT,
        }
    }
}

/// Configuration for one ledger instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The only identity allowed to withdraw fees.
    pub operator: AccountId,
    /// Distinguishes ledgers deployed by the same operator.
    #[serde(default)]
    pub instance_nonce: u64,
    #[serde(default)]
    pub fee: FeeConfig,
}

impl LedgerConfig {
    #[must_use]
    pub fn new(operator: AccountId, fee: FeeConfig) -> Self {
        Self {
            operator,
            instance_nonce: 0,
            fee,
        }
    }

    #[must_use]
    pub fn with_instance_nonce(mut self, nonce: u64) -> Self {
        self.instance_nonce = nonce;
        self
    }

    /// The instance id this configuration deploys to.
    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        InstanceId::derive(&self.operator, self.instance_nonce)
    }

    /// # Errors
    /// `Configuration` if the fee settings are invalid.
    pub fn validate(&self) -> Result<()> {
        self.fee.validate()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse, and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
