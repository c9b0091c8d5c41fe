//! # Grant: a custodied deposit keyed by its commitment
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  redeem(proof)   ┌──────────┐
//!   │ PENDING ├─────────────────▶│ REDEEMED │
//!   └────┬────┘                  └──────────┘
//!        │ claim (depositor, lock elapsed)
//!        ▼
//!   ┌───────────┐
//!   │ RECLAIMED │
//!   └───────────┘
//! ```
//!
//! Terminal records are never deleted. They stay queryable, and their
//! commitment stays reserved forever so it cannot be granted again.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Commitment, CommitmentMode, GrantId};

/// The lifecycle state of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantState {
    /// Funds are held, awaiting redemption or reclaim.
    Pending,
    /// A redeemer proved knowledge of the preimage and was paid. **Terminal.**
    Redeemed,
    /// The depositor took the funds back after the lock elapsed. **Terminal.**
    Reclaimed,
}

impl GrantState {
    /// Can a grant in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Pending, Self::Redeemed | Self::Reclaimed))
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for GrantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Redeemed => write!(f, "REDEEMED"),
            Self::Reclaimed => write!(f, "RECLAIMED"),
        }
    }
}

/// One accepted deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    /// Lookup key; unique for the lifetime of the ledger.
    pub commitment: Commitment,
    /// The party that funded the grant. Only they may reclaim it.
    pub depositor: AccountId,
    /// Value attached to the deposit.
    pub gross_amount: Decimal,
    /// Value payable on redemption or reclaim (`gross - fee`).
    pub net_amount: Decimal,
    /// Operator cut taken at grant time.
    pub fee_amount: Decimal,
    pub created_at: DateTime<Utc>,
    /// Hours after `created_at` before the depositor may reclaim.
    pub lock_duration_hours: u32,
    pub state: GrantState,
    pub mode: CommitmentMode,
    /// Present only for address-bound grants.
    pub bound_recipient: Option<AccountId>,
    /// When the grant reached a terminal state.
    pub settled_at: Option<DateTime<Utc>>,
}

impl Grant {
    /// Earliest instant at which the depositor may reclaim, or `None` if it
    /// lies past the last representable date.
    #[must_use]
    pub fn checked_claimable_at(&self) -> Option<DateTime<Utc>> {
        unlock_time(self.created_at, self.lock_duration_hours)
    }

    /// Earliest instant at which the depositor may reclaim. Saturates at
    /// `DateTime::<Utc>::MAX_UTC`.
    #[must_use]
    pub fn claimable_at(&self) -> DateTime<Utc> {
        self.checked_claimable_at().unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Inclusive boundary: claimable exactly at `claimable_at()`.
    #[must_use]
    pub fn is_claimable_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.claimable_at()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == GrantState::Pending
    }
}

/// `created_at + lock_hours`, or `None` on calendar overflow.
#[must_use]
pub fn unlock_time(created_at: DateTime<Utc>, lock_hours: u32) -> Option<DateTime<Utc>> {
    created_at.checked_add_signed(Duration::hours(i64::from(lock_hours)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_grant(created_at: DateTime<Utc>, hours: u32) -> Grant {
        Grant {
            id: GrantId::new(),
            commitment: Commitment([7u8; 32]),
            depositor: AccountId([1u8; 32]),
            gross_amount: Decimal::new(2, 0),
            net_amount: Decimal::new(2, 0),
            fee_amount: Decimal::ZERO,
            created_at,
            lock_duration_hours: hours,
            state: GrantState::Pending,
            mode: CommitmentMode::OpenSecret,
            bound_recipient: None,
            settled_at: None,
        }
    }

    #[test]
    fn state_transitions_valid() {
        assert!(GrantState::Pending.can_transition_to(GrantState::Redeemed));
        assert!(GrantState::Pending.can_transition_to(GrantState::Reclaimed));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!GrantState::Pending.can_transition_to(GrantState::Pending));
        assert!(!GrantState::Redeemed.can_transition_to(GrantState::Reclaimed));
        assert!(!GrantState::Redeemed.can_transition_to(GrantState::Pending));
        assert!(!GrantState::Reclaimed.can_transition_to(GrantState::Redeemed));
        assert!(!GrantState::Reclaimed.can_transition_to(GrantState::Pending));
    }

    #[test]
    fn claim_boundary_is_inclusive() {
        let t0 = Utc::now();
        let grant = make_grant(t0, 12);
        let unlock = t0 + Duration::hours(12);
        assert_eq!(grant.claimable_at(), unlock);
        assert!(!grant.is_claimable_at(unlock - Duration::seconds(1)));
        assert!(grant.is_claimable_at(unlock));
        assert!(grant.is_claimable_at(unlock + Duration::seconds(1)));
    }

    #[test]
    fn unlock_time_overflow_saturates() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        assert!(unlock_time(late, 2).is_none());
        assert!(unlock_time(late, 0).is_some());

        let grant = make_grant(late, 2);
        assert!(grant.checked_claimable_at().is_none());
        assert_eq!(grant.claimable_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!grant.is_claimable_at(late));
    }

    #[test]
    fn zero_lock_is_immediately_claimable() {
        let t0 = Utc::now();
        assert!(make_grant(t0, 0).is_claimable_at(t0));
    }

    #[test]
    fn state_display() {
        assert_eq!(GrantState::Pending.to_string(), "PENDING");
        assert_eq!(GrantState::Reclaimed.to_string(), "RECLAIMED");
        assert!(GrantState::Redeemed.is_terminal());
        assert!(!GrantState::Pending.is_terminal());
    }

    #[test]
    fn serde_roundtrip() {
        let grant = make_grant(Utc::now(), 12);
        let json = serde_json::to_string(&grant).unwrap();
        let back: Grant = serde_json::from_str(&json).unwrap();
        assert_eq!(grant.id, back.id);
        assert_eq!(grant.net_amount, back.net_amount);
        assert_eq!(grant.claimable_at(), back.claimable_at());
    }
}
