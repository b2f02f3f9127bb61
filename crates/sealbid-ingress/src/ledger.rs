//! Bidder ledger: the repository of per-identity records for one round.
//!
//! Records live in a dense `Vec` in registration order, with an
//! identity → index map for lookup. Iteration therefore follows
//! registration order exactly, which is what makes the earliest-registrant
//! tie-break deterministic.
//!
//! Every mutating call validates all of its preconditions before touching
//! any field: a failing call leaves the ledger byte-for-byte unchanged.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sealbid_types::{
    AccountId, Amount, BidderRecord, CommitmentDigest, Disposition, Gate, Nonce, Quantity, Result,
    SealbidError, ensure_non_negative,
};

use crate::{commitment::CommitmentVerifier, gates::PhaseGates};

/// Bidder records plus the round's registration/commit/reveal counters.
#[derive(Debug, Default)]
pub struct BidderLedger {
    /// Records in registration order.
    records: Vec<BidderRecord>,
    /// Identity → position in `records`.
    index: HashMap<AccountId, usize>,
    total_committed: usize,
    total_revealed: usize,
}

impl BidderLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for `account`.
    ///
    /// # Errors
    /// - `PhaseViolation` if the registration gate is closed
    /// - `DuplicateRegistration` if `account` already has a record
    pub fn register(&mut self, gates: &PhaseGates, account: AccountId) -> Result<()> {
        gates.check_open(Gate::Registration)?;
        if self.index.contains_key(&account) {
            return Err(SealbidError::DuplicateRegistration(account));
        }

        let position = self.records.len();
        self.records.push(BidderRecord::new(account, position));
        self.index.insert(account, position);

        tracing::debug!(bidder = %account, position, "Bidder registered");
        Ok(())
    }

    /// Store a sealed commitment and its escrowed deposit.
    ///
    /// # Errors
    /// - `PhaseViolation` if the commitment gate is closed
    /// - `NotRegistered` if `account` has no record
    /// - `AlreadyCommitted` if a commitment is already on file
    /// - `InvalidAmount` if `deposit` is negative
    pub fn commit(
        &mut self,
        gates: &PhaseGates,
        account: AccountId,
        digest: CommitmentDigest,
        deposit: Amount,
    ) -> Result<()> {
        gates.check_open(Gate::Commitment)?;
        let position = self.position(account)?;
        let record = &mut self.records[position];
        if record.committed {
            return Err(SealbidError::AlreadyCommitted(account));
        }
        ensure_non_negative(deposit, "deposit")?;

        record.commitment = digest;
        record.deposit = deposit;
        record.committed = true;
        self.total_committed += 1;

        tracing::debug!(
            bidder = %account,
            commitment = %digest.short(),
            %deposit,
            "Commitment accepted"
        );
        Ok(())
    }

    /// Disclose a bid and its nonce. Returns whether they hash to the stored
    /// commitment.
    ///
    /// The disclosed bid is recorded even on a mismatch: the reveal is final
    /// and the deposit will be seized at settlement. Financial validity is
    /// only decided at settlement, against the rate snapshot of that moment.
    ///
    /// # Errors
    /// - `NotRegistered` if `account` has no record
    /// - `RoundSettled` if the deposit was already finalized
    /// - `AlreadyRevealed` if this bidder already revealed
    /// - `NotCommitted` if there is no commitment to open
    /// - `InvalidAmount` if `bid` is negative
    pub fn reveal(
        &mut self,
        verifier: &dyn CommitmentVerifier,
        account: AccountId,
        bid: Quantity,
        nonce: &Nonce,
    ) -> Result<bool> {
        let position = self.position(account)?;
        let record = &mut self.records[position];
        if record.is_settled() {
            return Err(SealbidError::RoundSettled);
        }
        if record.revealed {
            return Err(SealbidError::AlreadyRevealed(account));
        }
        if !record.committed {
            return Err(SealbidError::NotCommitted(account));
        }
        ensure_non_negative(bid, "bid")?;

        let matched = verifier.verify(&record.commitment, bid, nonce, account);
        record.revealed_bid = bid;
        record.revealed = true;
        record.hash_matched = matched;
        record.valid = matched;

        if matched {
            tracing::debug!(bidder = %account, %bid, "Reveal matched commitment");
        } else {
            tracing::warn!(
                bidder = %account,
                %bid,
                commitment = %record.commitment.short(),
                "Reveal does not match commitment; deposit will be seized"
            );
        }
        self.total_revealed += 1;
        Ok(matched)
    }

    /// Finalize one deposit: record the settlement decision and release the
    /// escrowed amount from the ledger. Returns the deposit that was held.
    ///
    /// # Errors
    /// - `NotRegistered` if `account` has no record
    /// - `Internal` if the deposit was already finalized this round
    pub fn finalize_deposit(
        &mut self,
        account: AccountId,
        valid: bool,
        disposition: Disposition,
    ) -> Result<Amount> {
        let position = self.position(account)?;
        let record = &mut self.records[position];
        if record.is_settled() {
            return Err(SealbidError::Internal(format!(
                "deposit of {account} already finalized as {}",
                record.disposition.map_or_else(String::new, |d| d.to_string())
            )));
        }

        let held = record.deposit;
        record.valid = valid;
        record.disposition = Some(disposition);
        record.deposit = Decimal::ZERO;
        Ok(held)
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, account: AccountId) -> Option<&BidderRecord> {
        self.index.get(&account).map(|&i| &self.records[i])
    }

    /// All records in registration order.
    #[must_use]
    pub fn records(&self) -> &[BidderRecord] {
        &self.records
    }

    /// Iterate records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BidderRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn total_registered(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn total_committed(&self) -> usize {
        self.total_committed
    }

    #[must_use]
    pub fn total_revealed(&self) -> usize {
        self.total_revealed
    }

    /// Sum of deposits still held in escrow.
    #[must_use]
    pub fn total_escrowed(&self) -> Amount {
        self.records
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.deposit))
    }

    /// Number of records; same as [`total_registered`](Self::total_registered).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove every record and zero the counters. Returns how many records
    /// were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.index.clear();
        self.total_committed = 0;
        self.total_revealed = 0;
        removed
    }

    fn position(&self, account: AccountId) -> Result<usize> {
        self.index
            .get(&account)
            .copied()
            .ok_or(SealbidError::NotRegistered(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::{Sha256CommitmentVerifier, compute_commitment};

    fn setup() -> (BidderLedger, PhaseGates) {
        (BidderLedger::new(), PhaseGates::new())
    }

    fn committed(
        ledger: &mut BidderLedger,
        gates: &PhaseGates,
        bid: i64,
        deposit: i64,
    ) -> (AccountId, Nonce) {
        let account = AccountId::new();
        let nonce = Nonce::random();
        ledger.register(gates, account).unwrap();
        ledger
            .commit(
                gates,
                account,
                compute_commitment(Decimal::from(bid), &nonce, account),
                Decimal::from(deposit),
            )
            .unwrap();
        (account, nonce)
    }

    #[test]
    fn register_creates_record_in_order() {
        let (mut ledger, gates) = setup();
        let a = AccountId::new();
        let b = AccountId::new();
        ledger.register(&gates, a).unwrap();
        ledger.register(&gates, b).unwrap();

        assert_eq!(ledger.total_registered(), 2);
        let order: Vec<_> = ledger.iter().map(|r| r.account).collect();
        assert_eq!(order, vec![a, b]);
        assert_eq!(ledger.get(b).unwrap().registration_index, 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let (mut ledger, gates) = setup();
        let a = AccountId::new();
        ledger.register(&gates, a).unwrap();
        let err = ledger.register(&gates, a).unwrap_err();
        assert!(matches!(err, SealbidError::DuplicateRegistration(id) if id == a));
        assert_eq!(ledger.total_registered(), 1);
    }

    #[test]
    fn register_after_close_fails() {
        let (mut ledger, mut gates) = setup();
        gates.close(Gate::Registration).unwrap();
        let err = ledger.register(&gates, AccountId::new()).unwrap_err();
        assert!(matches!(
            err,
            SealbidError::PhaseViolation {
                gate: Gate::Registration
            }
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn commit_before_register_fails_and_leaves_ledger_unchanged() {
        let (mut ledger, gates) = setup();
        let a = AccountId::new();
        let err = ledger
            .commit(&gates, a, CommitmentDigest([1; 32]), Decimal::from(10))
            .unwrap_err();
        assert!(matches!(err, SealbidError::NotRegistered(_)));
        assert_eq!(ledger.total_committed(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn commit_after_close_fails_and_leaves_ledger_unchanged() {
        let (mut ledger, mut gates) = setup();
        let a = AccountId::new();
        ledger.register(&gates, a).unwrap();
        gates.close(Gate::Commitment).unwrap();

        let err = ledger
            .commit(&gates, a, CommitmentDigest([1; 32]), Decimal::from(10))
            .unwrap_err();
        assert!(matches!(err, SealbidError::PhaseViolation { .. }));
        let rec = ledger.get(a).unwrap();
        assert!(!rec.committed);
        assert_eq!(rec.deposit, Decimal::ZERO);
        assert_eq!(ledger.total_committed(), 0);
    }

    #[test]
    fn second_commit_cannot_overwrite() {
        let (mut ledger, gates) = setup();
        let (a, _) = committed(&mut ledger, &gates, 50, 100);
        let original = ledger.get(a).unwrap().commitment;

        let err = ledger
            .commit(&gates, a, CommitmentDigest([7; 32]), Decimal::from(999))
            .unwrap_err();
        assert!(matches!(err, SealbidError::AlreadyCommitted(_)));
        let rec = ledger.get(a).unwrap();
        assert_eq!(rec.commitment, original);
        assert_eq!(rec.deposit, Decimal::from(100));
        assert_eq!(ledger.total_committed(), 1);
    }

    #[test]
    fn negative_deposit_rejected() {
        let (mut ledger, gates) = setup();
        let a = AccountId::new();
        ledger.register(&gates, a).unwrap();
        let err = ledger
            .commit(&gates, a, CommitmentDigest([1; 32]), Decimal::from(-5))
            .unwrap_err();
        assert!(matches!(err, SealbidError::InvalidAmount { .. }));
        assert!(!ledger.get(a).unwrap().committed);
    }

    #[test]
    fn reveal_matches_exact_opening() {
        let (mut ledger, gates) = setup();
        let (a, nonce) = committed(&mut ledger, &gates, 50, 100);

        let matched = ledger
            .reveal(&Sha256CommitmentVerifier, a, Decimal::from(50), &nonce)
            .unwrap();
        assert!(matched);
        let rec = ledger.get(a).unwrap();
        assert!(rec.revealed && rec.hash_matched && rec.valid);
        assert_eq!(rec.revealed_bid, Decimal::from(50));
        assert_eq!(ledger.total_revealed(), 1);
    }

    #[test]
    fn reveal_with_wrong_values_records_mismatch() {
        let (mut ledger, gates) = setup();
        let (a, nonce) = committed(&mut ledger, &gates, 50, 100);

        // Same digits, different value: 5.0 vs 50.
        let matched = ledger
            .reveal(&Sha256CommitmentVerifier, a, Decimal::new(50, 1), &nonce)
            .unwrap();
        assert!(!matched);
        let rec = ledger.get(a).unwrap();
        assert!(rec.revealed);
        assert!(!rec.valid);
        assert_eq!(rec.revealed_bid, Decimal::new(50, 1));
    }

    #[test]
    fn reveal_is_allowed_while_commitment_open() {
        let (mut ledger, gates) = setup();
        let (a, nonce) = committed(&mut ledger, &gates, 10, 10);
        assert!(!gates.commitment_closed());
        assert!(
            ledger
                .reveal(&Sha256CommitmentVerifier, a, Decimal::from(10), &nonce)
                .unwrap()
        );
    }

    #[test]
    fn reveal_error_ordering() {
        let (mut ledger, gates) = setup();
        let verifier = Sha256CommitmentVerifier;

        let stranger = AccountId::new();
        let err = ledger
            .reveal(&verifier, stranger, Decimal::ONE, &Nonce::random())
            .unwrap_err();
        assert!(matches!(err, SealbidError::NotRegistered(_)));

        let registered = AccountId::new();
        ledger.register(&gates, registered).unwrap();
        let err = ledger
            .reveal(&verifier, registered, Decimal::ONE, &Nonce::random())
            .unwrap_err();
        assert!(matches!(err, SealbidError::NotCommitted(_)));

        let (a, nonce) = committed(&mut ledger, &gates, 1, 1);
        ledger.reveal(&verifier, a, Decimal::ONE, &nonce).unwrap();
        let err = ledger.reveal(&verifier, a, Decimal::ONE, &nonce).unwrap_err();
        assert!(matches!(err, SealbidError::AlreadyRevealed(_)));
        assert_eq!(ledger.total_revealed(), 1);
    }

    #[test]
    fn counters_respect_ordering_invariant() {
        let (mut ledger, gates) = setup();
        let (a, nonce) = committed(&mut ledger, &gates, 3, 3);
        ledger.register(&gates, AccountId::new()).unwrap();
        ledger
            .reveal(&Sha256CommitmentVerifier, a, Decimal::from(3), &nonce)
            .unwrap();
        assert!(ledger.total_revealed() <= ledger.total_committed());
        assert!(ledger.total_committed() <= ledger.total_registered());
        assert_eq!(
            (
                ledger.total_registered(),
                ledger.total_committed(),
                ledger.total_revealed()
            ),
            (2, 1, 1)
        );
    }

    #[test]
    fn reveal_after_finalize_rejected_and_record_untouched() {
        let (mut ledger, gates) = setup();
        let (a, nonce) = committed(&mut ledger, &gates, 10, 40);
        ledger
            .finalize_deposit(a, false, Disposition::Seized)
            .unwrap();

        let err = ledger
            .reveal(&Sha256CommitmentVerifier, a, Decimal::from(10), &nonce)
            .unwrap_err();
        assert!(matches!(err, SealbidError::RoundSettled));

        let rec = ledger.get(a).unwrap();
        assert!(!rec.valid);
        assert!(!rec.revealed);
        assert!(!rec.hash_matched);
        assert_eq!(rec.disposition, Some(Disposition::Seized));
        assert_eq!(ledger.total_revealed(), 0);
    }

    #[test]
    fn finalize_deposit_releases_once() {
        let (mut ledger, gates) = setup();
        let (a, _) = committed(&mut ledger, &gates, 10, 40);
        assert_eq!(ledger.total_escrowed(), Decimal::from(40));

        let held = ledger
            .finalize_deposit(a, false, Disposition::Seized)
            .unwrap();
        assert_eq!(held, Decimal::from(40));
        assert_eq!(ledger.total_escrowed(), Decimal::ZERO);
        assert_eq!(ledger.get(a).unwrap().disposition, Some(Disposition::Seized));

        let err = ledger
            .finalize_deposit(a, false, Disposition::Seized)
            .unwrap_err();
        assert!(matches!(err, SealbidError::Internal(_)));
    }

    #[test]
    fn clear_removes_records_and_counters() {
        let (mut ledger, gates) = setup();
        committed(&mut ledger, &gates, 1, 1);
        committed(&mut ledger, &gates, 2, 2);
        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_committed(), 0);
        assert_eq!(ledger.total_revealed(), 0);
        assert_eq!(ledger.total_escrowed(), Decimal::ZERO);
    }
}
