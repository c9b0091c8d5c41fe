//! # granthub-types
//!
//! Shared types, errors, and configuration for the **GrantHub** escrow ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Commitment`], [`AccountId`], [`InstanceId`], [`GrantId`]
//! - **Proof material**: [`Secret`], [`Proof`], [`CommitmentMode`]
//! - **Grant model**: [`Grant`], [`GrantState`]
//! - **Events**: [`LedgerEvent`], [`EventRecord`]
//! - **Ledger totals**: [`LedgerTotals`]
//! - **Configuration**: [`LedgerConfig`], [`FeeConfig`]
//! - **Errors**: [`GranthubError`] with `GH_ERR_` prefix codes, [`TransferError`]
//! - **Constants**: domain separators and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod grant;
pub mod ids;
pub mod proof;
pub mod totals;

// Re-export all primary types at crate root for ergonomic imports:
//   use granthub_types::{Grant, GrantState, Commitment, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use grant::*;
pub use ids::*;
pub use proof::*;
pub use totals::*;

// Constants are accessed via `granthub_types::constants::FOO`
// (not re-exported to avoid name collisions).
