//! # granthub-escrow
//!
//! **Escrow engine for GrantHub**: holds deposits under hash commitments,
//! releases them to whoever proves knowledge of the preimage, and lets the
//! depositor take unredeemed funds back after a time lock.
//!
//! ## Architecture
//!
//! 1. **Clock**: logical time for lock checks ([`SystemClock`], [`ManualClock`])
//! 2. **FeePolicy**: splits each deposit into net value and operator cut
//! 3. **CommitmentRegistry**: `commitment -> Grant`, permanently unique keys
//! 4. **EscrowEngine**: grant / redeem / claim / withdraw-fee
//! 5. **EventLog**: append-only record of accepted operations
//!
//! ## Operation Flow
//!
//! ```text
//! caller → EscrowEngine.check() → Registry/Totals.effect() → ValueTransfer.pay()
//!        → EventLog.append()
//! ```
//!
//! The engine is single-writer: the surrounding sequencer delivers one
//! operation at a time and each either fully applies or has no effect.

pub mod clock;
pub mod engine;
pub mod event_log;
pub mod fee;
pub mod registry;
pub mod transfer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EscrowEngine, Payout};
pub use event_log::{EventLog, EventSink};
pub use fee::{FeePolicy, FeeSplit};
pub use registry::CommitmentRegistry;
pub use transfer::{PayoutBook, ValueTransfer};
