//! Identifiers used throughout GrantHub.
//!
//! `GrantId` uses UUIDv7 for time-ordered sorting. Everything else is a
//! fixed-width 32-byte value: commitments are SHA-256 digests, accounts and
//! instances are opaque 32-byte identities.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::GranthubError;

fn parse_hex32(s: &str) -> Result<[u8; 32], GranthubError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| GranthubError::Serialization(e.to_string()))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        GranthubError::Serialization(format!("expected 32 bytes, got {}", v.len()))
    })
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A commitment: the public lookup key and authorization anchor of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First four bytes in hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = GranthubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a party: depositor, recipient, or the ledger operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

impl FromStr for AccountId {
    type Err = GranthubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(Self)
    }
}

/// Random account for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

// ---------------------------------------------------------------------------
// InstanceId
// ---------------------------------------------------------------------------

/// Identifies one deployed escrow ledger.
///
/// Address-bound commitments hash this in, so a commitment computed for one
/// instance is useless against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InstanceId(pub [u8; 32]);

impl InstanceId {
    /// Derive the instance id from the deploying operator and a nonce.
    ///
    /// `SHA-256("granthub:instance:v1:" || operator || nonce_le)`
    #[must_use]
    pub fn derive(operator: &AccountId, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"granthub:instance:v1:");
        hasher.update(operator.as_bytes());
        hasher.update(nonce.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// GrantId
// ---------------------------------------------------------------------------

/// Identifier handed back by `grant()`. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GrantId(pub Uuid);

impl GrantId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for GrantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_hex_roundtrip() {
        let c = Commitment([0xab; 32]);
        let text = c.to_string();
        assert!(text.starts_with("0xabab"));
        let back: Commitment = text.parse().unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn commitment_parse_rejects_wrong_width() {
        let err = "0xdeadbeef".parse::<Commitment>().unwrap_err();
        assert!(matches!(err, GranthubError::Serialization(_)));
        assert!("zz".parse::<Commitment>().is_err());
    }

    #[test]
    fn instance_id_depends_on_operator_and_nonce() {
        let op = AccountId([1u8; 32]);
        let a = InstanceId::derive(&op, 0);
        assert_eq!(a, InstanceId::derive(&op, 0));
        assert_ne!(a, InstanceId::derive(&op, 1));
        assert_ne!(a, InstanceId::derive(&AccountId([2u8; 32]), 0));
    }

    #[test]
    fn grant_id_ordering() {
        let a = GrantId::new();
        let b = GrantId::new();
        assert!(a < b);
    }

    #[test]
    fn account_display_is_short() {
        let acct = AccountId([0x11; 32]);
        assert_eq!(acct.to_string(), "acct:1111111111111111");
        assert_ne!(AccountId::random(), AccountId::random());
    }

    #[test]
    fn serde_roundtrips() {
        let gid = GrantId::new();
        let json = serde_json::to_string(&gid).unwrap();
        let back: GrantId = serde_json::from_str(&json).unwrap();
        assert_eq!(gid, back);
    }
}
