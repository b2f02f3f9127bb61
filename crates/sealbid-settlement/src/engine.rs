//! Winner selection and deposit settlement.
//!
//! Settlement runs in two strictly separated steps:
//!
//! 1. [`SettlementEngine::plan`]: pure. Walks the ledger in registration
//!    order, converts each eligible bid at the rate snapshot, decides the
//!    winner and the fate of every committed deposit. Any error here leaves
//!    everything untouched.
//! 2. [`SettlementEngine::apply`]: writes those decisions into the ledger
//!    (dispositions, validity, zeroed deposits) and returns the report.
//!
//! Funds move only after both steps, driven by the caller from the report.
//! Nothing in here calls out of the engine.
//!
//! Per committed bidder:
//! - revealed, hash matched, deposit covers `required` → financially valid
//! - the valid bidder with the strictly greatest bid wins; ties keep the
//!   earliest registrant
//! - valid losers get their whole deposit back
//! - the winner gets `deposit − required` back
//! - everybody else (no reveal, bad reveal, short deposit) forfeits

use chrono::Utc;
use rust_decimal::Decimal;
use sealbid_ingress::{BidderLedger, PhaseGates};
use sealbid_types::{
    AccountId, Amount, BidderRecord, DepositOutcome, Disposition, ExchangeRate, Quantity, Result,
    RoundId, SealbidError, SettlementReport,
};

use crate::{conversion, supply_conservation::SupplyConservation};

/// The winning bid of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinningBid {
    pub account: AccountId,
    /// Revealed bid in quote units.
    pub bid: Quantity,
    /// Converted price in base minor units, kept from the deposit.
    pub price: Amount,
}

/// Planned fate of one committed deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeposit {
    pub outcome: DepositOutcome,
    /// Final value of the record's `valid` flag.
    pub valid: bool,
}

/// Everything settlement decided, before any of it is written.
#[derive(Debug, Clone)]
pub struct SettlementPlan {
    pub round: RoundId,
    pub rate: ExchangeRate,
    pub winner: Option<WinningBid>,
    /// One entry per committed bidder, in registration order.
    pub deposits: Vec<PlannedDeposit>,
}

impl SettlementPlan {
    /// `(deposited, refunded, retained)` summed over every planned deposit.
    pub fn totals(&self) -> Result<(Amount, Amount, Amount)> {
        let mut deposited = Decimal::ZERO;
        let mut refunded = Decimal::ZERO;
        let mut retained = Decimal::ZERO;
        for planned in &self.deposits {
            let o = &planned.outcome;
            deposited = checked_add(deposited, o.deposit)?;
            refunded = checked_add(refunded, o.refund)?;
            retained = checked_add(retained, o.retained)?;
        }
        Ok((deposited, refunded, retained))
    }
}

/// Computes and applies settlement for one round.
#[derive(Debug, Clone, Copy)]
pub struct SettlementEngine {
    /// Base minor units per whole base unit.
    base_scale: u64,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(base_scale: u64) -> Self {
        Self { base_scale }
    }

    #[must_use]
    pub fn base_scale(&self) -> u64 {
        self.base_scale
    }

    /// Settlement may run once every registrant has committed, or once the
    /// commitment gate has closed.
    #[must_use]
    pub fn is_ready(ledger: &BidderLedger, gates: &PhaseGates) -> bool {
        ledger.total_registered() == ledger.total_committed() || gates.commitment_closed()
    }

    /// Decide the winner and every deposit's fate. Pure.
    ///
    /// # Errors
    /// - `RateUnavailable` if `rate` is unknown
    /// - `ArithmeticOverflow` if a conversion or refund overflows
    /// - `Internal` if a deposit in the ledger was already finalized
    pub fn plan(
        &self,
        ledger: &BidderLedger,
        rate: ExchangeRate,
        round: RoundId,
    ) -> Result<SettlementPlan> {
        if rate.is_unknown() {
            return Err(SealbidError::RateUnavailable);
        }

        // Pass 1: financial check + winner scan, registration order.
        let mut checked: Vec<(&BidderRecord, Option<Amount>)> =
            Vec::with_capacity(ledger.total_committed());
        let mut winner: Option<WinningBid> = None;

        for record in ledger.iter().filter(|r| r.committed) {
            if record.is_settled() {
                return Err(SealbidError::Internal(format!(
                    "deposit of {} already finalized in {round}",
                    record.account
                )));
            }

            let covered = if record.is_eligible() {
                let required =
                    conversion::required_deposit(record.revealed_bid, rate, self.base_scale)?;
                if record.deposit >= required {
                    Some(required)
                } else {
                    tracing::debug!(
                        bidder = %record.account,
                        bid = %record.revealed_bid,
                        deposit = %record.deposit,
                        %required,
                        "Deposit does not cover converted bid"
                    );
                    None
                }
            } else {
                None
            };

            if let Some(price) = covered {
                // Strictly greater: an equal bid never displaces an earlier registrant.
                if winner.is_none_or(|w| record.revealed_bid > w.bid) {
                    winner = Some(WinningBid {
                        account: record.account,
                        bid: record.revealed_bid,
                        price,
                    });
                }
            }
            checked.push((record, covered));
        }

        // Pass 2: dispositions.
        let winner_account = winner.map(|w| w.account);
        let deposits = checked
            .into_iter()
            .map(|(record, covered)| {
                let (refund, retained, disposition) = match covered {
                    Some(price) if Some(record.account) == winner_account => {
                        let overhead = record.deposit.checked_sub(price).ok_or_else(|| {
                            SealbidError::overflow(format!("{} - {price}", record.deposit))
                        })?;
                        (overhead, price, Disposition::OverheadRefunded)
                    }
                    Some(_) => (record.deposit, Decimal::ZERO, Disposition::Refunded),
                    None => (Decimal::ZERO, record.deposit, Disposition::Seized),
                };
                Ok(PlannedDeposit {
                    outcome: DepositOutcome {
                        account: record.account,
                        deposit: record.deposit,
                        refund,
                        retained,
                        disposition,
                    },
                    valid: covered.is_some(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SettlementPlan {
            round,
            rate,
            winner,
            deposits,
        })
    }

    /// Write a plan into the ledger and produce the settlement report.
    ///
    /// The plan is checked against the ledger and against the conservation
    /// identity before the first write, so a stale or unbalanced plan
    /// changes nothing.
    ///
    /// # Errors
    /// - `Internal` if the plan no longer matches the ledger
    /// - `SupplyInvariantViolation` if the plan does not conserve value
    /// - `ArithmeticOverflow` if the totals overflow
    pub fn apply(
        &self,
        plan: SettlementPlan,
        ledger: &mut BidderLedger,
    ) -> Result<SettlementReport> {
        for planned in &plan.deposits {
            let account = planned.outcome.account;
            let record = ledger
                .get(account)
                .ok_or(SealbidError::NotRegistered(account))?;
            if record.is_settled() || record.deposit != planned.outcome.deposit {
                return Err(SealbidError::Internal(format!(
                    "stale settlement plan for {account}"
                )));
            }
        }

        let (total_deposited, total_refunded, total_retained) = plan.totals()?;

        let report = SettlementReport {
            round: plan.round,
            winner: plan.winner.map(|w| w.account),
            winning_bid: plan.winner.map(|w| w.bid),
            winner_price: plan.winner.map(|w| w.price),
            rate: plan.rate,
            outcomes: plan.deposits.iter().map(|p| p.outcome.clone()).collect(),
            total_deposited,
            total_refunded,
            total_retained,
            settled_at: Utc::now(),
        };
        SupplyConservation::verify_report(&report)?;

        for planned in &plan.deposits {
            let o = &planned.outcome;
            ledger.finalize_deposit(o.account, planned.valid, o.disposition)?;
            if o.disposition == Disposition::Seized {
                tracing::warn!(
                    bidder = %o.account,
                    amount = %o.retained,
                    "Deposit seized"
                );
            }
        }

        tracing::info!(
            round = %report.round,
            winner = ?report.winner,
            rate = %report.rate,
            deposited = %report.total_deposited,
            refunded = %report.total_refunded,
            retained = %report.total_retained,
            "Settlement complete"
        );
        Ok(report)
    }
}

fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b)
        .ok_or_else(|| SealbidError::overflow(format!("{a} + {b}")))
}

#[cfg(test)]
mod tests {
    use sealbid_ingress::{Sha256CommitmentVerifier, compute_commitment};
    use sealbid_types::{Gate, Nonce};

    use super::*;

    const SCALE: u64 = 100;

    struct Round {
        ledger: BidderLedger,
        gates: PhaseGates,
    }

    impl Round {
        fn new() -> Self {
            Self {
                ledger: BidderLedger::new(),
                gates: PhaseGates::new(),
            }
        }

        /// Register + commit; reveal `revealed` (which may differ from `bid`).
        fn bidder(&mut self, bid: i64, deposit: i64, revealed: Option<i64>) -> AccountId {
            let account = AccountId::new();
            let nonce = Nonce::random();
            self.ledger.register(&self.gates, account).unwrap();
            self.ledger
                .commit(
                    &self.gates,
                    account,
                    compute_commitment(Decimal::from(bid), &nonce, account),
                    Decimal::from(deposit),
                )
                .unwrap();
            if let Some(value) = revealed {
                self.ledger
                    .reveal(
                        &Sha256CommitmentVerifier,
                        account,
                        Decimal::from(value),
                        &nonce,
                    )
                    .unwrap();
            }
            account
        }

        fn plan(&self, rate: u64) -> SettlementPlan {
            SettlementEngine::new(SCALE)
                .plan(&self.ledger, ExchangeRate(rate), RoundId(0))
                .unwrap()
        }
    }

    fn disposition(plan: &SettlementPlan, account: AccountId) -> Disposition {
        plan.deposits
            .iter()
            .find(|p| p.outcome.account == account)
            .unwrap()
            .outcome
            .disposition
    }

    #[test]
    fn readiness_rules() {
        let mut round = Round::new();
        assert!(SettlementEngine::is_ready(&round.ledger, &round.gates));

        round.ledger.register(&round.gates, AccountId::new()).unwrap();
        assert!(!SettlementEngine::is_ready(&round.ledger, &round.gates));

        round.gates.close(Gate::Commitment).unwrap();
        assert!(SettlementEngine::is_ready(&round.ledger, &round.gates));
    }

    #[test]
    fn reference_round() {
        let mut round = Round::new();
        let a = round.bidder(50, 100, Some(50));
        let b = round.bidder(90, 200, Some(90));
        let c = round.bidder(80, 10, Some(80));

        let plan = round.plan(200);
        let winner = plan.winner.unwrap();
        assert_eq!(winner.account, b);
        assert_eq!(winner.price, Decimal::from(45));

        assert_eq!(disposition(&plan, a), Disposition::Refunded);
        assert_eq!(disposition(&plan, b), Disposition::OverheadRefunded);
        assert_eq!(disposition(&plan, c), Disposition::Seized);

        let b_outcome = &plan.deposits[1].outcome;
        assert_eq!(b_outcome.refund, Decimal::from(155));
        assert_eq!(b_outcome.retained, Decimal::from(45));
        assert!(!plan.deposits[2].valid);
    }

    #[test]
    fn tie_goes_to_earliest_registrant() {
        let mut round = Round::new();
        let first = round.bidder(70, 100, Some(70));
        let second = round.bidder(70, 100, Some(70));
        let plan = round.plan(100);
        assert_eq!(plan.winner.unwrap().account, first);
        assert_eq!(disposition(&plan, second), Disposition::Refunded);
    }

    #[test]
    fn higher_bid_with_short_deposit_does_not_win() {
        let mut round = Round::new();
        let rich = round.bidder(10, 1_000, Some(10));
        let short = round.bidder(1_000, 1, Some(1_000));
        let plan = round.plan(100);
        assert_eq!(plan.winner.unwrap().account, rich);
        assert_eq!(disposition(&plan, short), Disposition::Seized);
    }

    #[test]
    fn mismatched_and_missing_reveals_are_seized() {
        let mut round = Round::new();
        let liar = round.bidder(50, 100, Some(99));
        let silent = round.bidder(50, 100, None);
        let plan = round.plan(200);
        assert!(plan.winner.is_none());
        assert_eq!(disposition(&plan, liar), Disposition::Seized);
        assert_eq!(disposition(&plan, silent), Disposition::Seized);
    }

    #[test]
    fn registered_without_commit_has_no_deposit_entry() {
        let mut round = Round::new();
        round.ledger.register(&round.gates, AccountId::new()).unwrap();
        let bidder = round.bidder(1, 1, Some(1));
        let plan = round.plan(1);
        assert_eq!(plan.deposits.len(), 1);
        assert_eq!(plan.deposits[0].outcome.account, bidder);
    }

    #[test]
    fn exact_cover_refunds_nothing_to_winner() {
        let mut round = Round::new();
        let w = round.bidder(90, 45, Some(90));
        let plan = round.plan(200);
        assert_eq!(plan.winner.unwrap().account, w);
        assert_eq!(plan.deposits[0].outcome.refund, Decimal::ZERO);
        assert_eq!(plan.deposits[0].outcome.retained, Decimal::from(45));
    }

    #[test]
    fn unknown_rate_fails_without_touching_ledger() {
        let mut round = Round::new();
        let a = round.bidder(50, 100, Some(50));
        let err = SettlementEngine::new(SCALE)
            .plan(&round.ledger, ExchangeRate::UNKNOWN, RoundId(0))
            .unwrap_err();
        assert!(matches!(err, SealbidError::RateUnavailable));
        assert_eq!(round.ledger.get(a).unwrap().deposit, Decimal::from(100));
    }

    #[test]
    fn apply_finalizes_ledger_and_conserves() {
        let mut round = Round::new();
        let a = round.bidder(50, 100, Some(50));
        let b = round.bidder(90, 200, Some(90));
        let c = round.bidder(80, 10, Some(80));
        let plan = round.plan(200);

        let report = SettlementEngine::new(SCALE)
            .apply(plan, &mut round.ledger)
            .unwrap();
        assert_eq!(report.winner, Some(b));
        assert_eq!(report.total_deposited, Decimal::from(310));
        assert_eq!(report.total_refunded, Decimal::from(255));
        assert_eq!(report.total_retained, Decimal::from(55));
        assert_eq!(report.total_forfeited(), Decimal::from(10));
        assert_eq!(round.ledger.total_escrowed(), Decimal::ZERO);

        let rec_a = round.ledger.get(a).unwrap();
        assert!(rec_a.valid);
        assert_eq!(rec_a.disposition, Some(Disposition::Refunded));
        let rec_c = round.ledger.get(c).unwrap();
        assert!(!rec_c.valid, "short deposit is marked invalid");
        assert_eq!(rec_c.disposition, Some(Disposition::Seized));
    }

    #[test]
    fn stale_plan_rejected() {
        let mut round = Round::new();
        round.bidder(50, 100, Some(50));
        let plan = round.plan(200);
        let engine = SettlementEngine::new(SCALE);
        engine.apply(plan.clone(), &mut round.ledger).unwrap();

        let err = engine.apply(plan, &mut round.ledger).unwrap_err();
        assert!(matches!(err, SealbidError::Internal(_)));
    }

    #[test]
    fn no_valid_bids_seizes_everything() {
        let mut round = Round::new();
        round.bidder(5, 5, None);
        round.bidder(6, 6, None);
        round.gates.close(Gate::Commitment).unwrap();
        let plan = round.plan(10);
        let report = SettlementEngine::new(SCALE)
            .apply(plan, &mut round.ledger)
            .unwrap();
        assert!(report.winner.is_none());
        assert_eq!(report.total_refunded, Decimal::ZERO);
        assert_eq!(report.total_retained, Decimal::from(11));
        assert_eq!(report.payouts().count(), 0);
    }
}
