//! Ledger event records for the GrantHub audit trail.
//!
//! Every accepted operation produces exactly one [`LedgerEvent`], wrapped in
//! an [`EventRecord`] carrying a sequence number and the logical time at
//! which it was recorded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Commitment};

/// One accepted ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A deposit was accepted into custody.
    Granted {
        commitment: Commitment,
        depositor: AccountId,
        gross_amount: Decimal,
        net_amount: Decimal,
        fee_amount: Decimal,
        claimable_at: DateTime<Utc>,
    },
    /// A grant was paid out against a valid proof.
    Redeemed {
        commitment: Commitment,
        recipient: AccountId,
        amount: Decimal,
    },
    /// A depositor took back an expired grant.
    Reclaimed {
        commitment: Commitment,
        depositor: AccountId,
        amount: Decimal,
    },
    /// The operator withdrew accrued fees.
    FeeWithdrawn { operator: AccountId, amount: Decimal },
}

impl LedgerEvent {
    /// Short kind tag, e.g. `"GRANTED"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Granted { .. } => "GRANTED",
            Self::Redeemed { .. } => "REDEEMED",
            Self::Reclaimed { .. } => "RECLAIMED",
            Self::FeeWithdrawn { .. } => "FEE_WITHDRAWN",
        }
    }

    /// The commitment this event concerns, if any.
    #[must_use]
    pub fn commitment(&self) -> Option<Commitment> {
        match self {
            Self::Granted { commitment, .. }
            | Self::Redeemed { commitment, .. }
            | Self::Reclaimed { commitment, .. } => Some(*commitment),
            Self::FeeWithdrawn { .. } => None,
        }
    }

    /// The party that caused or benefited from the operation.
    #[must_use]
    pub fn actor(&self) -> AccountId {
        match self {
            Self::Granted { depositor, .. } | Self::Reclaimed { depositor, .. } => *depositor,
            Self::Redeemed { recipient, .. } => *recipient,
            Self::FeeWithdrawn { operator, .. } => *operator,
        }
    }

    /// Amount moved. Deposits report the gross amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Granted { gross_amount, .. } => *gross_amount,
            Self::Redeemed { amount, .. }
            | Self::Reclaimed { amount, .. }
            | Self::FeeWithdrawn { amount, .. } => *amount,
        }
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.kind(), self.actor(), self.amount())
    }
}

/// An event as stored in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at zero.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: LedgerEvent,
}
