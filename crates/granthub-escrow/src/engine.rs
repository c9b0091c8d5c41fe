//! Escrow engine: the only component that moves value.
//!
//! Every mutating operation follows the same order:
//!
//! 1. **Checks**: validate everything against the registry, fee policy and
//!    clock. A failure here returns before anything changes.
//! 2. **Effects**: transition the grant and update the ledger totals.
//! 3. **Interaction**: hand the payment to the [`ValueTransfer`]. Anything the
//!    recipient does with the engine from inside the transfer sees the
//!    post-effects state, so a re-entrant `redeem`/`claim` on the same grant
//!    hits `InvalidTransition`.
//! 4. **Record**: append the event.
//!
//! If the transfer fails, step 2 is reversed and the operation returns
//! `TransferFailed` with no event recorded.

use chrono::{DateTime, Utc};
use granthub_commitment::{BindingContext, CommitmentRequest, verify_proof};
use granthub_types::{
    AccountId, Commitment, CommitmentMode, EventRecord, Grant, GrantId, GrantState,
    GranthubError, InstanceId, LedgerConfig, LedgerEvent, LedgerTotals, Proof, Result,
    constants, unlock_time,
};
use rust_decimal::Decimal;
use subtle::{Choice, ConstantTimeEq};

use crate::{
    clock::{Clock, SystemClock},
    event_log::{EventLog, EventSink},
    fee::FeePolicy,
    registry::CommitmentRegistry,
    transfer::ValueTransfer,
};

/// A completed outbound payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub recipient: AccountId,
    pub amount: Decimal,
}

/// Single-writer escrow state machine.
pub struct EscrowEngine {
    instance: InstanceId,
    operator: AccountId,
    fee_policy: FeePolicy,
    clock: Box<dyn Clock>,
    registry: CommitmentRegistry,
    totals: LedgerTotals,
    events: EventLog,
}

impl EscrowEngine {
    /// Build a ledger from its configuration.
    ///
    /// # Errors
    /// `Configuration` if the fee settings are invalid.
    pub fn new(config: &LedgerConfig, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let engine = Self {
            instance: config.instance_id(),
            operator: config.operator,
            fee_policy: FeePolicy::new(config.fee)?,
            clock,
            registry: CommitmentRegistry::new(),
            totals: LedgerTotals::new(),
            events: EventLog::new(),
        };
        tracing::info!(
            instance = %engine.instance,
            operator = %engine.operator,
            cut_enabled = config.fee.cut_enabled,
            cut = %config.fee.cut_amount,
            "{} ledger v{} initialised",
            constants::ENGINE_NAME,
            constants::VERSION
        );
        Ok(engine)
    }

    /// Build a ledger that reads wall-clock time.
    pub fn with_system_clock(config: &LedgerConfig) -> Result<Self> {
        Self::new(config, Box::new(SystemClock))
    }

    // =================================================================
    // Operations
    // =================================================================

    /// Accept a deposit of `gross_amount` into custody under `commitment`.
    ///
    /// # Errors
    /// - `DuplicateCommitment` if `commitment` was ever used
    /// - `InvalidGrant` if `bound_recipient` is not present exactly for
    ///   address-bound grants
    /// - `LockOverflow` if the unlock time is past the last representable date
    /// - `InsufficientGrant` unless `gross_amount` exceeds the fee cut
    pub fn grant(
        &mut self,
        commitment: Commitment,
        lock_duration_hours: u32,
        gross_amount: Decimal,
        depositor: AccountId,
        mode: CommitmentMode,
        bound_recipient: Option<AccountId>,
    ) -> Result<GrantId> {
        if self.registry.contains(&commitment) {
            return Err(GranthubError::DuplicateCommitment(commitment));
        }
        if mode.requires_recipient() != bound_recipient.is_some() {
            return Err(GranthubError::InvalidGrant {
                reason: format!("mode {mode} with bound recipient {bound_recipient:?}"),
            });
        }
        let now = self.clock.now();
        let claimable_at = unlock_time(now, lock_duration_hours).ok_or(
            GranthubError::LockOverflow {
                hours: lock_duration_hours,
                from: now,
            },
        )?;

        let split = self.fee_policy.apply(gross_amount)?;
        let held = checked_add(self.totals.held_balance, gross_amount)?;
        let fees = checked_add(self.totals.fee_balance, split.fee)?;
        let deposited = checked_add(self.totals.total_deposited, gross_amount)?;

        let grant = Grant {
            id: GrantId::new(),
            commitment,
            depositor,
            gross_amount,
            net_amount: split.net,
            fee_amount: split.fee,
            created_at: now,
            lock_duration_hours,
            state: GrantState::Pending,
            mode,
            bound_recipient,
            settled_at: None,
        };
        let id = grant.id;
        self.registry.insert(commitment, grant)?;

        self.totals.held_balance = held;
        self.totals.fee_balance = fees;
        self.totals.total_deposited = deposited;

        tracing::info!(
            commitment = %commitment.short(),
            depositor = %depositor,
            gross = %gross_amount,
            net = %split.net,
            fee = %split.fee,
            mode = %mode,
            "Grant accepted"
        );
        self.events.append(
            LedgerEvent::Granted {
                commitment,
                depositor,
                gross_amount,
                net_amount: split.net,
                fee_amount: split.fee,
                claimable_at,
            },
            now,
        );
        Ok(id)
    }

    /// Pay a pending grant to whoever proves knowledge of its preimage.
    ///
    /// Open-secret and two-part grants pay `caller`; address-bound grants
    /// pay the bound recipient, who must also be the caller.
    ///
    /// # Errors
    /// - `UnknownCommitment`, or `InvalidTransition` if not pending
    /// - `AuthorizationFailed` if the proof or caller identity do not match
    /// - `TransferFailed` if the payment fails (the grant stays pending)
    pub fn redeem(
        &mut self,
        commitment: &Commitment,
        caller: AccountId,
        proof: &Proof,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Payout> {
        let grant = self.registry.get(commitment)?;
        if !grant.is_pending() {
            return Err(GranthubError::InvalidTransition {
                commitment: *commitment,
                from: grant.state,
                to: GrantState::Redeemed,
            });
        }

        let ctx = BindingContext {
            instance: self.instance,
            bound_recipient: grant.bound_recipient,
        };
        let proof_ok = verify_proof(grant.mode, commitment, proof, &ctx);
        let caller_ok = grant
            .bound_recipient
            .map_or(Choice::from(1), |bound| same_account(&bound, &caller));
        if !bool::from(proof_ok & caller_ok) {
            tracing::warn!(commitment = %commitment.short(), caller = %caller, "Redeem rejected");
            return Err(GranthubError::AuthorizationFailed);
        }

        let recipient = grant.bound_recipient.unwrap_or(caller);
        let amount = grant.net_amount;

        let now = self.clock.now();
        self.settle_grant(commitment, GrantState::Redeemed, amount, now)?;
        self.pay_out(recipient, amount, transfer, |engine| {
            engine.registry.restore_pending(commitment)
        })?;

        tracing::info!(
            commitment = %commitment.short(),
            recipient = %recipient,
            amount = %amount,
            "Grant redeemed"
        );
        self.events.append(
            LedgerEvent::Redeemed {
                commitment: *commitment,
                recipient,
                amount,
            },
            now,
        );
        Ok(Payout { recipient, amount })
    }

    /// Return a pending grant to its depositor once the lock has elapsed.
    ///
    /// # Errors
    /// - `UnknownCommitment`, or `InvalidTransition` if not pending
    /// - `AuthorizationFailed` if `caller` is not the depositor
    /// - `LockNotElapsed` before `created_at + lock_duration`
    /// - `TransferFailed` if the payment fails (the grant stays pending)
    pub fn claim(
        &mut self,
        commitment: &Commitment,
        caller: AccountId,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Payout> {
        let grant = self.registry.get(commitment)?;
        if !grant.is_pending() {
            return Err(GranthubError::InvalidTransition {
                commitment: *commitment,
                from: grant.state,
                to: GrantState::Reclaimed,
            });
        }
        if grant.depositor != caller {
            tracing::warn!(commitment = %commitment.short(), caller = %caller, "Claim by non-depositor");
            return Err(GranthubError::AuthorizationFailed);
        }
        let now = self.clock.now();
        if !grant.is_claimable_at(now) {
            return Err(GranthubError::LockNotElapsed {
                claimable_at: grant.claimable_at(),
            });
        }

        let depositor = grant.depositor;
        let amount = grant.net_amount;

        self.settle_grant(commitment, GrantState::Reclaimed, amount, now)?;
        self.pay_out(depositor, amount, transfer, |engine| {
            engine.registry.restore_pending(commitment)
        })?;

        tracing::info!(
            commitment = %commitment.short(),
            depositor = %depositor,
            amount = %amount,
            "Grant reclaimed"
        );
        self.events.append(
            LedgerEvent::Reclaimed {
                commitment: *commitment,
                depositor,
                amount,
            },
            now,
        );
        Ok(Payout {
            recipient: depositor,
            amount,
        })
    }

    /// Pay the whole accrued fee balance to the operator.
    ///
    /// # Errors
    /// - `NoFeeBalance` if `caller` is not the operator or nothing accrued
    /// - `TransferFailed` if the payment fails (the balance is kept)
    pub fn withdraw_fee(
        &mut self,
        caller: AccountId,
        transfer: &mut impl ValueTransfer,
    ) -> Result<Payout> {
        if caller != self.operator || self.totals.fee_balance <= Decimal::ZERO {
            return Err(GranthubError::NoFeeBalance);
        }

        let amount = self.totals.fee_balance;
        let held = checked_sub(self.totals.held_balance, amount)?;
        let paid = checked_add(self.totals.total_paid_out, amount)?;
        self.totals.fee_balance = Decimal::ZERO;
        self.totals.held_balance = held;
        self.totals.total_paid_out = paid;

        let now = self.clock.now();
        self.pay_out(caller, amount, transfer, |engine| {
            engine.totals.fee_balance = checked_add(engine.totals.fee_balance, amount)?;
            Ok(())
        })?;

        tracing::info!(operator = %caller, amount = %amount, "Fees withdrawn");
        self.events.append(
            LedgerEvent::FeeWithdrawn {
                operator: caller,
                amount,
            },
            now,
        );
        Ok(Payout {
            recipient: caller,
            amount,
        })
    }

    // =================================================================
    // Effects / interaction helpers
    // =================================================================

    /// Transition a pending grant and release its net amount from custody.
    fn settle_grant(
        &mut self,
        commitment: &Commitment,
        to: GrantState,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let held = checked_sub(self.totals.held_balance, amount)?;
        let paid = checked_add(self.totals.total_paid_out, amount)?;
        self.registry.transition(commitment, to, now)?;
        self.totals.held_balance = held;
        self.totals.total_paid_out = paid;
        Ok(())
    }

    /// Issue the payment. On failure, put `amount` back into custody, run
    /// `undo` for the operation-specific effects, and report `TransferFailed`.
    fn pay_out(
        &mut self,
        to: AccountId,
        amount: Decimal,
        transfer: &mut impl ValueTransfer,
        undo: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let Err(err) = transfer.transfer(self, to, amount) else {
            return Ok(());
        };

        tracing::warn!(to = %to, amount = %amount, error = %err, "Transfer failed; rolling back");
        self.totals.held_balance = checked_add(self.totals.held_balance, amount)?;
        self.totals.total_paid_out = checked_sub(self.totals.total_paid_out, amount)?;
        undo(self)?;
        Err(GranthubError::TransferFailed {
            to,
            reason: err.to_string(),
        })
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Compute a commitment for this ledger. Address-bound requests are
    /// bound to this ledger's instance id.
    #[must_use]
    pub fn compute_commitment(&self, request: CommitmentRequest) -> Commitment {
        request.bind(self.instance).commitment()
    }

    /// Whether `commitment` was ever granted, in any state.
    #[must_use]
    pub fn is_commitment_used(&self, commitment: &Commitment) -> bool {
        self.registry.contains(commitment)
    }

    /// # Errors
    /// `UnknownCommitment` if never granted.
    pub fn grant_info(&self, commitment: &Commitment) -> Result<&Grant> {
        self.registry.get(commitment)
    }

    #[must_use]
    pub fn grant_by_id(&self, id: &GrantId) -> Option<&Grant> {
        self.registry.get_by_id(id)
    }

    pub fn pending_grants(&self) -> impl Iterator<Item = &Grant> {
        self.registry.pending()
    }

    /// Pending grants of `depositor` whose lock has elapsed now.
    #[must_use]
    pub fn claimable_grants(&self, depositor: &AccountId) -> Vec<&Grant> {
        let now = self.clock.now();
        let mut grants: Vec<&Grant> = self
            .registry
            .pending()
            .filter(|g| g.depositor == *depositor && g.is_claimable_at(now))
            .collect();
        grants.sort_by_key(|g| g.id);
        grants
    }

    /// Total number of grants ever created.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn held_balance(&self) -> Decimal {
        self.totals.held_balance
    }

    #[must_use]
    pub fn fee_balance(&self) -> Decimal {
        self.totals.fee_balance
    }

    #[must_use]
    pub fn totals(&self) -> LedgerTotals {
        self.totals
    }

    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        self.instance
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    #[must_use]
    pub fn fee_policy(&self) -> &FeePolicy {
        &self.fee_policy
    }

    /// Current logical time according to the engine's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    #[must_use]
    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        self.events.since(sequence)
    }

    /// Attach an external event subscriber.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.events.subscribe(sink);
    }

    /// Check both ledger identities:
    ///
    /// ```text
    /// held_balance == Σ(net of PENDING grants) + fee_balance
    /// held_balance == total_deposited - total_paid_out
    /// ```
    ///
    /// # Errors
    /// `ConservationViolation` if either fails.
    pub fn verify_conservation(&self) -> Result<()> {
        let liabilities = self
            .registry
            .pending()
            .try_fold(Decimal::ZERO, |acc, g| checked_add(acc, g.net_amount))?;
        let expected = checked_add(liabilities, self.totals.fee_balance)?;

        if self.totals.held_balance != expected {
            return Err(GranthubError::ConservationViolation {
                reason: format!(
                    "held {} != pending {} + fees {}",
                    self.totals.held_balance, liabilities, self.totals.fee_balance
                ),
            });
        }
        if !self.totals.supply_balanced() {
            return Err(GranthubError::ConservationViolation {
                reason: format!(
                    "held {} != deposited {} - paid out {}",
                    self.totals.held_balance,
                    self.totals.total_deposited,
                    self.totals.total_paid_out
                ),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for EscrowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowEngine")
            .field("instance", &self.instance)
            .field("operator", &self.operator)
            .field("fee_policy", &self.fee_policy)
            .field("grants", &self.registry.len())
            .field("totals", &self.totals)
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

fn same_account(a: &AccountId, b: &AccountId) -> Choice {
    a.0.as_slice().ct_eq(b.0.as_slice())
}

fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or(GranthubError::AmountOverflow)
}

fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or(GranthubError::AmountOverflow)
}
