//! Error types for the GrantHub escrow ledger.
//!
//! All errors use the `GH_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Grant lifecycle errors
//! - 2xx: Authorization errors
//! - 3xx: Fee errors
//! - 4xx: Value movement errors
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors
//!
//! Every rejection is atomic: when an operation returns one of these, the
//! ledger is exactly as it was before the call.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, Commitment, GrantState};

/// Central error enum for all GrantHub operations.
#[derive(Debug, Error)]
pub enum GranthubError {
    // =================================================================
    // Grant Lifecycle Errors (1xx)
    // =================================================================
    /// The commitment was already used by some grant, in any state.
    #[error("GH_ERR_100: Commitment already used: {0}")]
    DuplicateCommitment(Commitment),

    /// The deposit does not exceed the operator cut.
    #[error("GH_ERR_101: Insufficient grant: deposit {gross} must exceed cut {cut}")]
    InsufficientGrant { gross: Decimal, cut: Decimal },

    /// No grant was ever created for this commitment.
    #[error("GH_ERR_102: Unknown commitment: {0}")]
    UnknownCommitment(Commitment),

    /// The grant is not in a state that allows this transition.
    #[error("GH_ERR_103: Invalid transition for {commitment}: {from} -> {to}")]
    InvalidTransition {
        commitment: Commitment,
        from: GrantState,
        to: GrantState,
    },

    /// Grant parameters are inconsistent (mode vs. bound recipient).
    #[error("GH_ERR_104: Invalid grant: {reason}")]
    InvalidGrant { reason: String },

    /// The depositor tried to reclaim before the lock elapsed.
    #[error("GH_ERR_105: Lock not elapsed: claimable at {claimable_at}")]
    LockNotElapsed { claimable_at: DateTime<Utc> },

    /// The unlock time falls outside the representable date range.
    #[error("GH_ERR_106: Lock of {hours}h from {from} overflows the calendar")]
    LockOverflow { hours: u32, from: DateTime<Utc> },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// Proof or caller identity did not match. Carries no detail.
    #[error("GH_ERR_200: Authorization failed")]
    AuthorizationFailed,

    // =================================================================
    // Fee Errors (3xx)
    // =================================================================
    /// Nothing to withdraw, or the caller is not the operator.
    #[error("GH_ERR_300: No fee balance available to caller")]
    NoFeeBalance,

    // =================================================================
    // Value Movement Errors (4xx)
    // =================================================================
    /// The outbound payment failed; the operation was rolled back.
    #[error("GH_ERR_400: Transfer to {to} failed: {reason}")]
    TransferFailed { to: AccountId, reason: String },

    /// A balance computation would overflow.
    #[error("GH_ERR_401: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Invariant Violations (8xx)
    // =================================================================
    /// Custody does not match outstanding liabilities. Critical safety alert.
    #[error("GH_ERR_800: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("GH_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("GH_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("GH_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("GH_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, GranthubError>;

impl From<std::io::Error> for GranthubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GranthubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Failure reported by a value-transfer implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

impl TransferError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
