//! Process-wide ledger totals.
//!
//! `held_balance` is everything currently in custody; `fee_balance` is the
//! part of it the operator may withdraw. The lifetime counters give a second
//! identity to check against:
//!
//! ```text
//! held_balance == total_deposited - total_paid_out
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger-wide balances owned by the escrow engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Sum of all value currently custodied.
    pub held_balance: Decimal,
    /// Accrued, withdrawable operator income. Included in `held_balance`.
    pub fee_balance: Decimal,
    /// Sum of all gross deposits ever accepted.
    pub total_deposited: Decimal,
    /// Sum of all value ever paid out (redeem, claim, fee withdrawal).
    pub total_paid_out: Decimal,
}

impl LedgerTotals {
    #[must_use]
    pub fn new() -> Self {
        Self {
            held_balance: Decimal::ZERO,
            fee_balance: Decimal::ZERO,
            total_deposited: Decimal::ZERO,
            total_paid_out: Decimal::ZERO,
        }
    }

    /// Custodied value that belongs to pending grants.
    #[must_use]
    pub fn grant_liabilities(&self) -> Decimal {
        self.held_balance - self.fee_balance
    }

    /// Whether `held == deposited - paid_out`.
    #[must_use]
    pub fn supply_balanced(&self) -> bool {
        self.held_balance == self.total_deposited - self.total_paid_out
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.held_balance.is_zero() && self.fee_balance.is_zero()
    }
}

impl Default for LedgerTotals {
    fn default() -> Self {
        Self::new()
    }
}
