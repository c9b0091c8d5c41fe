//! End-to-end tests of the escrow ledger.
//!
//! Each test drives a full grant lifecycle through the public engine API
//! with a manual clock, so lock boundaries are hit exactly.

use chrono::Duration;
use granthub_commitment::CommitmentRequest;
use granthub_escrow::{EscrowEngine, ManualClock, PayoutBook};
use granthub_types::*;
use rand::Rng;
use rust_decimal::Decimal;

/// Helper: one ledger plus the accounts that interact with it.
struct Harness {
    engine: EscrowEngine,
    clock: ManualClock,
    book: PayoutBook,
    operator: AccountId,
    depositor: AccountId,
    claimant: AccountId,
}

impl Harness {
    fn new(fee: FeeConfig) -> Self {
        let operator = AccountId::random();
        let clock = ManualClock::default();
        let engine = EscrowEngine::new(&LedgerConfig::new(operator, fee), Box::new(clock.clone()))
            .unwrap();
        Self {
            engine,
            clock,
            book: PayoutBook::new(),
            operator,
            depositor: AccountId::random(),
            claimant: AccountId::random(),
        }
    }

    fn open_grant(&mut self, secret: &Secret, hours: u32, amount: Decimal) -> Result<Commitment> {
        let c = self
            .engine
            .compute_commitment(CommitmentRequest::OpenSecret(secret.clone()));
        self.engine
            .grant(c, hours, amount, self.depositor, CommitmentMode::OpenSecret, None)?;
        Ok(c)
    }

    fn assert_conserved(&self) {
        self.engine.verify_conservation().unwrap();
        let totals = self.engine.totals();
        assert_eq!(
            totals.total_paid_out,
            self.book.total(),
            "paid-out total must match what the transfer layer received"
        );
    }
}

fn units(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn redeem_with_correct_secret_pays_claimant() {
    let mut h = Harness::new(FeeConfig::disabled());
    let secret = Secret::padded32("p4ssw0rd");
    let c = h.open_grant(&secret, 12, units(2)).unwrap();

    let payout = h
        .engine
        .redeem(&c, h.claimant, &Proof::Secret(secret), &mut h.book)
        .unwrap();

    assert_eq!(payout.recipient, h.claimant);
    assert_eq!(payout.amount, units(2));
    assert_eq!(h.book.credited(&h.claimant), units(2));
    assert_eq!(h.engine.held_balance(), Decimal::ZERO);

    let last = h.engine.events().last().unwrap();
    assert_eq!(last.event.kind(), "REDEEMED");
    assert!(matches!(
        last.event,
        LedgerEvent::Redeemed { commitment, recipient, amount }
            if commitment == c && recipient == h.claimant && amount == units(2)
    ));
    h.assert_conserved();
}

#[test]
fn fee_cut_applied_and_duplicate_rejected() {
    let mut h = Harness::new(FeeConfig::cut(units(1)));
    let secret = Secret::padded32("p4ssw0rd");
    let c = h.open_grant(&secret, 12, units(2)).unwrap();

    let grant = h.engine.grant_info(&c).unwrap();
    assert_eq!(grant.net_amount, units(1));
    assert_eq!(grant.fee_amount, units(1));
    assert_eq!(h.engine.fee_balance(), units(1));

    let err = h.open_grant(&secret, 12, units(2)).unwrap_err();
    assert!(matches!(err, GranthubError::DuplicateCommitment(x) if x == c));
    assert_eq!(h.engine.grant_count(), 1);
    assert_eq!(h.engine.held_balance(), units(2));
    h.assert_conserved();
}

#[test]
fn deposit_equal_to_cut_is_insufficient() {
    let mut h = Harness::new(FeeConfig::cut(units(1)));
    let err = h
        .open_grant(&Secret::padded32("p4ssw0rd"), 12, units(1))
        .unwrap_err();
    assert!(matches!(
        err,
        GranthubError::InsufficientGrant { gross, cut } if gross == units(1) && cut == units(1)
    ));
    assert_eq!(h.engine.grant_count(), 0);
    assert!(h.engine.events().is_empty());
}

#[test]
fn claim_lifecycle_lock_then_identity_then_success() {
    let mut h = Harness::new(FeeConfig::disabled());
    let c = h.open_grant(&Secret::random(), 12, units(1)).unwrap();

    h.clock.advance(Duration::hours(11));
    let err = h.engine.claim(&c, h.depositor, &mut h.book).unwrap_err();
    assert!(matches!(err, GranthubError::LockNotElapsed { .. }));

    h.clock.advance(Duration::hours(1));
    let err = h.engine.claim(&c, h.claimant, &mut h.book).unwrap_err();
    assert!(matches!(err, GranthubError::AuthorizationFailed));

    let payout = h.engine.claim(&c, h.depositor, &mut h.book).unwrap();
    assert_eq!(payout.recipient, h.depositor);
    assert_eq!(payout.amount, units(1));
    assert_eq!(h.book.credited(&h.depositor), units(1));
    assert_eq!(
        h.engine.grant_info(&c).unwrap().state,
        GrantState::Reclaimed
    );
    assert_eq!(h.engine.events().last().unwrap().event.kind(), "RECLAIMED");
    h.assert_conserved();
}

#[test]
fn address_bound_rejects_other_caller_with_correct_secret() {
    let mut h = Harness::new(FeeConfig::disabled());
    let secret = Secret::padded32("p4ssw0rd");
    let c = h.engine.compute_commitment(CommitmentRequest::AddressBound {
        recipient: h.claimant,
        secret: secret.clone(),
    });
    h.engine
        .grant(c, 12, units(2), h.depositor, CommitmentMode::AddressBound, Some(h.claimant))
        .unwrap();

    let intruder = AccountId::random();
    let err = h
        .engine
        .redeem(&c, intruder, &Proof::Secret(secret.clone()), &mut h.book)
        .unwrap_err();
    assert!(matches!(err, GranthubError::AuthorizationFailed));
    assert_eq!(h.book.credited(&intruder), Decimal::ZERO);
    assert!(h.engine.grant_info(&c).unwrap().is_pending());

    let payout = h
        .engine
        .redeem(&c, h.claimant, &Proof::Secret(secret), &mut h.book)
        .unwrap();
    assert_eq!(payout.recipient, h.claimant);
    h.assert_conserved();
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn claim_boundary_is_inclusive() {
    let mut h = Harness::new(FeeConfig::disabled());
    let c = h.open_grant(&Secret::random(), 12, units(1)).unwrap();
    let unlock = h.engine.grant_info(&c).unwrap().claimable_at();

    h.clock.set(unlock - Duration::seconds(1));
    let err = h.engine.claim(&c, h.depositor, &mut h.book).unwrap_err();
    assert!(matches!(
        err,
        GranthubError::LockNotElapsed { claimable_at } if claimable_at == unlock
    ));

    h.clock.set(unlock);
    h.engine.claim(&c, h.depositor, &mut h.book).unwrap();
}

#[test]
fn zero_lock_is_claimable_immediately() {
    let mut h = Harness::new(FeeConfig::disabled());
    let c = h.open_grant(&Secret::random(), 0, units(1)).unwrap();
    h.engine.claim(&c, h.depositor, &mut h.book).unwrap();
}

#[test]
fn commitment_is_single_use_across_lifetime() {
    let mut h = Harness::new(FeeConfig::disabled());
    let secret = Secret::random();
    let c = h.open_grant(&secret, 1, units(3)).unwrap();
    h.engine
        .redeem(&c, h.claimant, &Proof::Secret(secret.clone()), &mut h.book)
        .unwrap();

    let err = h.open_grant(&secret, 1, units(3)).unwrap_err();
    assert!(matches!(err, GranthubError::DuplicateCommitment(_)));
    assert!(h.engine.is_commitment_used(&c));
}

#[test]
fn at_most_one_terminal_transition() {
    let mut h = Harness::new(FeeConfig::disabled());
    let secret = Secret::random();
    let c = h.open_grant(&secret, 1, units(3)).unwrap();
    h.clock.advance(Duration::hours(2));

    h.engine.claim(&c, h.depositor, &mut h.book).unwrap();

    let err = h
        .engine
        .redeem(&c, h.claimant, &Proof::Secret(secret.clone()), &mut h.book)
        .unwrap_err();
    assert!(matches!(err, GranthubError::InvalidTransition { from: GrantState::Reclaimed, .. }));
    let err = h.engine.claim(&c, h.depositor, &mut h.book).unwrap_err();
    assert!(matches!(err, GranthubError::InvalidTransition { .. }));

    assert_eq!(h.book.transfer_count(), 1);
    assert_eq!(h.book.total(), units(3));
}

#[test]
fn two_part_grant_needs_both_halves_in_order() {
    let mut h = Harness::new(FeeConfig::disabled());
    let first = Secret::from("left-half");
    let second = Secret::from("right-half");
    let c = h
        .engine
        .compute_commitment(CommitmentRequest::TwoPart(first.clone(), second.clone()));
    h.engine
        .grant(c, 12, units(4), h.depositor, CommitmentMode::TwoPart, None)
        .unwrap();

    let swapped = Proof::pair(second.clone(), first.clone());
    let err = h.engine.redeem(&c, h.claimant, &swapped, &mut h.book).unwrap_err();
    assert!(matches!(err, GranthubError::AuthorizationFailed));

    let payout = h
        .engine
        .redeem(&c, h.claimant, &Proof::pair(first, second), &mut h.book)
        .unwrap();
    assert_eq!(payout.amount, units(4));
    h.assert_conserved();
}

#[test]
fn conservation_holds_over_random_sequences() {
    let mut rng = rand::thread_rng();
    let mut h = Harness::new(FeeConfig::cut(Decimal::new(1, 2)));
    let mut live: Vec<(Commitment, Secret)> = Vec::new();

    for _ in 0..200 {
        match rng.gen_range(0..5) {
            0 | 1 => {
                let secret = Secret::random();
                let amount = Decimal::new(rng.gen_range(1..10_000), 2);
                if let Ok(c) = h.open_grant(&secret, rng.gen_range(0..4), amount) {
                    live.push((c, secret));
                }
            }
            2 if !live.is_empty() => {
                let (c, secret) = live.swap_remove(rng.gen_range(0..live.len()));
                h.engine
                    .redeem(&c, h.claimant, &Proof::Secret(secret), &mut h.book)
                    .unwrap();
            }
            3 if !live.is_empty() => {
                let idx = rng.gen_range(0..live.len());
                let c = live[idx].0;
                if h.engine.claim(&c, h.depositor, &mut h.book).is_ok() {
                    live.swap_remove(idx);
                }
            }
            _ => {
                h.clock.advance(Duration::minutes(rng.gen_range(0..90)));
                let _ = h.engine.withdraw_fee(h.operator, &mut h.book);
            }
        }
        h.assert_conserved();
    }

    assert_eq!(h.engine.pending_grants().count(), live.len());
    let totals = h.engine.totals();
    assert_eq!(
        totals.total_deposited - totals.total_paid_out,
        totals.held_balance
    );
}

#[test]
fn event_log_is_sequential_and_replayable() {
    let mut h = Harness::new(FeeConfig::cut(units(1)));
    let a = h.open_grant(&Secret::random(), 12, units(5)).unwrap();
    let secret = Secret::random();
    let b = h.open_grant(&secret, 12, units(3)).unwrap();
    h.engine
        .redeem(&b, h.claimant, &Proof::Secret(secret), &mut h.book)
        .unwrap();
    h.engine.withdraw_fee(h.operator, &mut h.book).unwrap();

    let events = h.engine.events();
    let kinds: Vec<&str> = events.iter().map(|r| r.event.kind()).collect();
    assert_eq!(kinds, ["GRANTED", "GRANTED", "REDEEMED", "FEE_WITHDRAWN"]);
    for (i, rec) in events.iter().enumerate() {
        assert_eq!(rec.sequence, i as u64);
    }
    assert_eq!(events[0].event.commitment(), Some(a));
    assert_eq!(h.engine.events_since(2).len(), 2);

    // Replaying the log reproduces custody.
    let mut held = Decimal::ZERO;
    for rec in events {
        match rec.event {
            LedgerEvent::Granted { gross_amount, .. } => held += gross_amount,
            LedgerEvent::Redeemed { amount, .. }
            | LedgerEvent::Reclaimed { amount, .. }
            | LedgerEvent::FeeWithdrawn { amount, .. } => held -= amount,
        }
    }
    assert_eq!(held, h.engine.held_balance());
    assert_eq!(held, units(4));
}

#[test]
fn ledgers_bind_address_commitments_to_instance() {
    let operator = AccountId::random();
    let first = EscrowEngine::with_system_clock(&LedgerConfig::new(operator, FeeConfig::default()))
        .unwrap();
    let second = EscrowEngine::with_system_clock(
        &LedgerConfig::new(operator, FeeConfig::default()).with_instance_nonce(1),
    )
    .unwrap();

    let recipient = AccountId::random();
    let request = || CommitmentRequest::AddressBound {
        recipient,
        secret: Secret::padded32("p4ssw0rd"),
    };
    assert_ne!(first.compute_commitment(request()), second.compute_commitment(request()));

    let open = || CommitmentRequest::OpenSecret(Secret::padded32("p4ssw0rd"));
    assert_eq!(first.compute_commitment(open()), second.compute_commitment(open()));
}
