//! Commitment derivation.
//!
//! Every scheme is `SHA-256(domain || fields...)` where each variable-length
//! field is prefixed with its length as a little-endian `u64`. Length
//! prefixes make the encoding injective, so `("ab", "c")` and `("a", "bc")`
//! never collide in the two-part scheme.

use granthub_types::{
    AccountId, Commitment, CommitmentMode, InstanceId, Secret, constants,
};
use sha2::{Digest, Sha256};

/// Inputs for one commitment computation, tagged by scheme.
#[derive(Debug, Clone)]
pub enum CommitmentInput {
    OpenSecret {
        secret: Secret,
    },
    AddressBound {
        instance: InstanceId,
        recipient: AccountId,
        secret: Secret,
    },
    TwoPart {
        first: Secret,
        second: Secret,
    },
}

impl CommitmentInput {
    #[must_use]
    pub fn mode(&self) -> CommitmentMode {
        match self {
            Self::OpenSecret { .. } => CommitmentMode::OpenSecret,
            Self::AddressBound { .. } => CommitmentMode::AddressBound,
            Self::TwoPart { .. } => CommitmentMode::TwoPart,
        }
    }

    /// Derive the commitment for these inputs.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        match self {
            Self::OpenSecret { secret } => open_secret(secret),
            Self::AddressBound {
                instance,
                recipient,
                secret,
            } => address_bound(instance, recipient, secret),
            Self::TwoPart { first, second } => two_part(first, second),
        }
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn finish(hasher: Sha256) -> Commitment {
    Commitment(hasher.finalize().into())
}

/// `H(secret)`: binds value to the secret only.
///
/// Not bound to an instance: reusing a secret on another ledger yields the
/// same commitment there.
#[must_use]
pub fn open_secret(secret: &Secret) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(constants::OPEN_SECRET_DOMAIN);
    update_field(&mut hasher, secret.as_bytes());
    finish(hasher)
}

/// `H(instance, recipient, secret)`.
#[must_use]
pub fn address_bound(instance: &InstanceId, recipient: &AccountId, secret: &Secret) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(constants::ADDRESS_BOUND_DOMAIN);
    hasher.update(instance.as_bytes());
    hasher.update(recipient.as_bytes());
    update_field(&mut hasher, secret.as_bytes());
    finish(hasher)
}

/// `H(part1, part2)`. Order matters.
#[must_use]
pub fn two_part(first: &Secret, second: &Secret) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(constants::TWO_PART_DOMAIN);
    update_field(&mut hasher, first.as_bytes());
    update_field(&mut hasher, second.as_bytes());
    finish(hasher)
}
