//! Secret material and the proofs presented at redemption.
//!
//! A [`Secret`] is never serialized and never printed: its `Debug` output is
//! redacted so it cannot leak through logs or error messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which commitment scheme produced a grant's commitment.
///
/// Fixed at grant time; determines the proof shape `redeem()` requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitmentMode {
    /// `H(secret)`. Anyone holding the secret may redeem.
    OpenSecret,
    /// `H(instance, recipient, secret)`. Only the bound recipient may redeem.
    AddressBound,
    /// `H(part1, part2)`. Both halves are needed.
    TwoPart,
}

impl CommitmentMode {
    /// Whether grants in this mode carry a bound recipient.
    #[must_use]
    pub fn requires_recipient(self) -> bool {
        matches!(self, Self::AddressBound)
    }
}

impl fmt::Display for CommitmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenSecret => write!(f, "OPEN_SECRET"),
            Self::AddressBound => write!(f, "ADDRESS_BOUND"),
            Self::TwoPart => write!(f, "TWO_PART"),
        }
    }
}

/// Secret preimage bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Right-pad a short password with zeros to 32 bytes.
    ///
    /// Passwords longer than 32 bytes are kept as-is.
    #[must_use]
    pub fn padded32(password: &str) -> Self {
        let mut bytes = password.as_bytes().to_vec();
        if bytes.len() < 32 {
            bytes.resize(32, 0);
        }
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Secret {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes redacted>)", self.0.len())
    }
}

/// Random 32-byte secret for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Secret {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>().to_vec())
    }
}

/// What a redeemer presents to prove knowledge of a grant's preimage.
#[derive(Debug, Clone)]
pub enum Proof {
    /// One secret (open-secret and address-bound modes).
    Secret(Secret),
    /// Both halves of a two-part secret, in commitment order.
    SecretPair(Secret, Secret),
}

impl Proof {
    #[must_use]
    pub fn single(secret: impl Into<Secret>) -> Self {
        Self::Secret(secret.into())
    }

    #[must_use]
    pub fn pair(first: impl Into<Secret>, second: impl Into<Secret>) -> Self {
        Self::SecretPair(first.into(), second.into())
    }
}
