//! Commitment registry: the `commitment -> Grant` map.
//!
//! Keys are permanent: a grant is never removed, so a commitment that was
//! used once (whatever its current state) can never be inserted again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use granthub_types::{Commitment, Grant, GrantId, GrantState, GranthubError, Result};

/// Owns every grant ever created, indexed by commitment and by id.
#[derive(Debug, Default)]
pub struct CommitmentRegistry {
    grants: HashMap<Commitment, Grant>,
    by_id: HashMap<GrantId, Commitment>,
}

impl CommitmentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new grant under `commitment`.
    ///
    /// # Errors
    /// `DuplicateCommitment` if the key was ever used before.
    pub fn insert(&mut self, commitment: Commitment, grant: Grant) -> Result<()> {
        if self.grants.contains_key(&commitment) {
            return Err(GranthubError::DuplicateCommitment(commitment));
        }
        tracing::debug!(commitment = %commitment.short(), grant = %grant.id, "Grant registered");
        self.by_id.insert(grant.id, commitment);
        self.grants.insert(commitment, grant);
        Ok(())
    }

    /// # Errors
    /// `UnknownCommitment` if no grant was ever created for `commitment`.
    pub fn get(&self, commitment: &Commitment) -> Result<&Grant> {
        self.grants
            .get(commitment)
            .ok_or(GranthubError::UnknownCommitment(*commitment))
    }

    /// Look up a grant by the id `grant()` returned.
    #[must_use]
    pub fn get_by_id(&self, id: &GrantId) -> Option<&Grant> {
        self.by_id.get(id).and_then(|c| self.grants.get(c))
    }

    /// Move a pending grant to a terminal state.
    ///
    /// # Errors
    /// - `UnknownCommitment` if the grant does not exist
    /// - `InvalidTransition` unless the grant is `Pending` and `new_state`
    ///   is `Redeemed` or `Reclaimed`
    pub fn transition(
        &mut self,
        commitment: &Commitment,
        new_state: GrantState,
        at: DateTime<Utc>,
    ) -> Result<&Grant> {
        let grant = self
            .grants
            .get_mut(commitment)
            .ok_or(GranthubError::UnknownCommitment(*commitment))?;

        if !grant.state.can_transition_to(new_state) {
            return Err(GranthubError::InvalidTransition {
                commitment: *commitment,
                from: grant.state,
                to: new_state,
            });
        }

        tracing::debug!(
            commitment = %commitment.short(),
            from = %grant.state,
            to = %new_state,
            "Grant transition"
        );
        grant.state = new_state;
        grant.settled_at = Some(at);
        Ok(&*grant)
    }

    /// Undo a terminal transition whose payout failed.
    ///
    /// Only the engine calls this, and only for the grant it just settled.
    pub(crate) fn restore_pending(&mut self, commitment: &Commitment) -> Result<()> {
        let grant = self
            .grants
            .get_mut(commitment)
            .ok_or(GranthubError::UnknownCommitment(*commitment))?;
        if grant.state == GrantState::Pending {
            return Err(GranthubError::Internal(format!(
                "restore_pending on {commitment}: already PENDING"
            )));
        }
        grant.state = GrantState::Pending;
        grant.settled_at = None;
        Ok(())
    }

    /// Whether `commitment` was ever used.
    #[must_use]
    pub fn contains(&self, commitment: &Commitment) -> bool {
        self.grants.contains_key(commitment)
    }

    /// All pending grants, in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &Grant> {
        self.grants.values().filter(|g| g.is_pending())
    }

    /// Number of grants ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Number of grants still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }
}
