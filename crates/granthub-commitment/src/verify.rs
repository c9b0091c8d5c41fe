//! Proof verification against a stored commitment.
//!
//! Verification returns a [`Choice`] rather than a `bool` so callers can fold
//! further checks (caller identity) in without branching, and comparisons are
//! constant-time. A proof of the wrong shape for the mode, a wrong secret,
//! and a right secret under the wrong binding all yield the same `0`.

use granthub_types::{AccountId, Commitment, CommitmentMode, InstanceId, Proof, Secret};
use subtle::{Choice, ConstantTimeEq};

use crate::scheme::{CommitmentInput, address_bound, open_secret, two_part};

/// Binding context stored alongside a grant.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext {
    pub instance: InstanceId,
    /// Set only for address-bound grants.
    pub bound_recipient: Option<AccountId>,
}

fn ct_matches(computed: &Commitment, expected: &Commitment) -> Choice {
    computed.0.as_slice().ct_eq(expected.0.as_slice())
}

/// Does `proof` open `commitment` under `mode` and `ctx`?
#[must_use]
pub fn verify_proof(
    mode: CommitmentMode,
    commitment: &Commitment,
    proof: &Proof,
    ctx: &BindingContext,
) -> Choice {
    match (mode, proof) {
        (CommitmentMode::OpenSecret, Proof::Secret(secret)) => {
            ct_matches(&open_secret(secret), commitment)
        }
        (CommitmentMode::AddressBound, Proof::Secret(secret)) => match ctx.bound_recipient {
            Some(recipient) => ct_matches(&address_bound(&ctx.instance, &recipient, secret), commitment),
            None => Choice::from(0),
        },
        (CommitmentMode::TwoPart, Proof::SecretPair(first, second)) => {
            ct_matches(&two_part(first, second), commitment)
        }
        _ => Choice::from(0),
    }
}

/// A commitment query before the ledger's instance id is bound in.
#[derive(Debug, Clone)]
pub enum CommitmentRequest {
    OpenSecret(Secret),
    AddressBound { recipient: AccountId, secret: Secret },
    TwoPart(Secret, Secret),
}

impl CommitmentRequest {
    /// Attach the ledger's instance id.
    #[must_use]
    pub fn bind(self, instance: InstanceId) -> CommitmentInput {
        match self {
            Self::OpenSecret(secret) => CommitmentInput::OpenSecret { secret },
            Self::AddressBound { recipient, secret } => CommitmentInput::AddressBound {
                instance,
                recipient,
                secret,
            },
            Self::TwoPart(first, second) => CommitmentInput::TwoPart { first, second },
        }
    }
}
