//! # granthub-commitment
//!
//! **Pure commitment derivation for GrantHub.** No state, no side effects:
//! the same inputs always produce the same [`Commitment`].
//!
//! Three schemes are supported, selected per grant by [`CommitmentMode`]:
//!
//! | Mode | Commitment | Redeemable by |
//! |------|------------|---------------|
//! | `OpenSecret` | `H(secret)` | anyone holding the secret |
//! | `AddressBound` | `H(instance, recipient, secret)` | the bound recipient only |
//! | `TwoPart` | `H(part1, part2)` | anyone holding both parts |
//!
//! [`Commitment`]: granthub_types::Commitment
//! [`CommitmentMode`]: granthub_types::CommitmentMode

pub mod scheme;
pub mod verify;

pub use scheme::{CommitmentInput, address_bound, open_secret, two_part};
pub use verify::{BindingContext, CommitmentRequest, verify_proof};
