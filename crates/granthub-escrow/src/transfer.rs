//! Outbound value transfer.
//!
//! The engine never pays anyone directly. After committing its own state it
//! hands the payment to a [`ValueTransfer`], passing itself along, because
//! on a real settlement layer the recipient side can run arbitrary logic,
//! including calling back into the ledger.

use std::collections::{HashMap, HashSet};

use granthub_types::{AccountId, TransferError};
use rust_decimal::Decimal;

use crate::engine::EscrowEngine;

/// Issues a payment out of custody.
pub trait ValueTransfer {
    /// Pay `amount` to `to`. `ledger` is the engine issuing the payment, in
    /// its post-effects state.
    ///
    /// # Errors
    /// Any error aborts the enclosing operation, which is then rolled back.
    fn transfer(
        &mut self,
        ledger: &mut EscrowEngine,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), TransferError>;
}

/// Records credits per account. Accounts marked as rejecting refuse payment.
#[derive(Debug, Default, Clone)]
pub struct PayoutBook {
    credits: HashMap<AccountId, Decimal>,
    rejecting: HashSet<AccountId>,
    transfers: usize,
}

impl PayoutBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every payment to `account` fail.
    pub fn reject(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    /// Total credited to `account` so far.
    #[must_use]
    pub fn credited(&self, account: &AccountId) -> Decimal {
        self.credits.get(account).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total credited across all accounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.credits.values().copied().sum()
    }

    /// Number of successful transfers.
    #[must_use]
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }
}

impl ValueTransfer for PayoutBook {
    fn transfer(
        &mut self,
        _ledger: &mut EscrowEngine,
        to: AccountId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        if self.rejecting.contains(&to) {
            return Err(TransferError::new(format!("{to} rejects payments")));
        }
        *self.credits.entry(to).or_insert(Decimal::ZERO) += amount;
        self.transfers += 1;
        Ok(())
    }
}
