//! Settlement result types.
//!
//! A settled round produces one [`DepositOutcome`] per committed bidder and
//! a [`SettlementReport`] that sums them. The report is the audit record:
//! for every outcome `deposit == refund + retained`, and the totals obey
//! the same identity. "Retained" covers both the winner's price and
//! forfeited deposits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, Disposition, ExchangeRate, Quantity, RoundId};

/// What settlement decided for one committed deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    pub account: AccountId,
    /// Deposit held before settlement.
    pub deposit: Amount,
    /// Amount returned to the bidder.
    pub refund: Amount,
    /// Amount kept by the engine (winner's price or forfeited deposit).
    pub retained: Amount,
    pub disposition: Disposition,
}

/// Full record of one settlement round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    pub round: RoundId,
    /// `None` when no bid was financially valid.
    pub winner: Option<AccountId>,
    /// The winner's revealed bid in quote units.
    pub winning_bid: Option<Quantity>,
    /// Base minor units the winner pays (kept from their deposit).
    pub winner_price: Option<Amount>,
    /// Rate snapshot the conversions were computed against.
    pub rate: ExchangeRate,
    /// One entry per committed bidder, in registration order.
    pub outcomes: Vec<DepositOutcome>,
    pub total_deposited: Amount,
    pub total_refunded: Amount,
    pub total_retained: Amount,
    pub settled_at: DateTime<Utc>,
}

impl SettlementReport {
    /// Refund transfers to execute, in registration order. Zero refunds
    /// (e.g. a winner whose deposit exactly covered the price) are skipped.
    pub fn payouts(&self) -> impl Iterator<Item = (AccountId, Amount)> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.refund > Decimal::ZERO)
            .map(|o| (o.account, o.refund))
    }

    /// Retained amounts that were forfeited rather than paid as the price.
    #[must_use]
    pub fn total_forfeited(&self) -> Amount {
        self.outcomes
            .iter()
            .filter(|o| o.disposition == Disposition::Seized)
            .map(|o| o.retained)
            .sum()
    }

    /// Look up the outcome for one bidder.
    #[must_use]
    pub fn outcome(&self, account: AccountId) -> Option<&DepositOutcome> {
        self.outcomes.iter().find(|o| o.account == account)
    }
}

/// Result of asking the engine to settle.
///
/// Only `Settled` means anything changed; the other variants are defined
/// no-ops rather than errors.
#[derive(Debug, Clone)]
pub enum SettlementStatus {
    /// Some registrants have not committed and the commitment gate is open.
    NotReady,
    /// This round was already settled; nothing left to do until reset.
    AlreadySettled,
    /// Settlement ran; refunds have been dispatched.
    Settled(SettlementReport),
}

impl SettlementStatus {
    #[must_use]
    pub fn report(&self) -> Option<&SettlementReport> {
        match self {
            Self::Settled(report) => Some(report),
            Self::NotReady | Self::AlreadySettled => None,
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Summary of a reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    /// Round that was closed out.
    pub closed_round: RoundId,
    /// Round that is now open.
    pub new_round: RoundId,
    /// Bidder records removed.
    pub bidders_cleared: usize,
    /// Deposits of an unsettled round booked as seized before clearing.
    pub unsettled_seized: Amount,
}
