//! # BidderRecord: one bidder's state within a round
//!
//! ## Lifecycle
//!
//! ```text
//!   register ──▶ commit ──▶ reveal ──▶ settle
//!                  │                     │
//!                  │ (never reveals)     ├─▶ REFUNDED          (valid, lost)
//!                  └────────────────────▶├─▶ OVERHEAD_REFUNDED (winner)
//!                                        └─▶ SEIZED            (everything else)
//! ```
//!
//! ## Invariants
//!
//! - `commitment` is written exactly once, by commit. Reveal only compares.
//! - `deposit` is written by commit and afterwards only by settlement.
//! - `valid` is derived by reveal (hash check) and settlement (financial
//!   check). There is no bidder-facing setter.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, CommitmentDigest, Quantity};

/// Final settlement outcome of a committed deposit.
///
/// Written once per round by settlement (or by reset for a round that was
/// never settled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    /// Valid losing bid: full deposit returned.
    Refunded,
    /// Winning bid: deposit minus the converted price returned.
    OverheadRefunded,
    /// Failed reveal, no reveal, or insufficient deposit: retained.
    Seized,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refunded => write!(f, "REFUNDED"),
            Self::OverheadRefunded => write!(f, "OVERHEAD_REFUNDED"),
            Self::Seized => write!(f, "SEIZED"),
        }
    }
}

/// Per-identity bookkeeping for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderRecord {
    /// Who this record belongs to.
    pub account: AccountId,
    /// Position in registration order (0 = first registrant).
    pub registration_index: usize,
    pub registered: bool,
    pub committed: bool,
    /// Hash submitted at commit time.
    pub commitment: CommitmentDigest,
    /// Base minor units escrowed at commit time.
    pub deposit: Amount,
    pub revealed: bool,
    /// Quote units disclosed at reveal, stored whether or not it matched.
    pub revealed_bid: Quantity,
    /// Whether the reveal hashed to `commitment`.
    pub hash_matched: bool,
    /// Hash match AND (after settlement) deposit covers the requirement.
    pub valid: bool,
    /// Set once by settlement.
    pub disposition: Option<Disposition>,
}

impl BidderRecord {
    /// Fresh record for a newly registered identity.
    #[must_use]
    pub fn new(account: AccountId, registration_index: usize) -> Self {
        Self {
            account,
            registration_index,
            registered: true,
            committed: false,
            commitment: CommitmentDigest::default(),
            deposit: Decimal::ZERO,
            revealed: false,
            revealed_bid: Decimal::ZERO,
            hash_matched: false,
            valid: false,
            disposition: None,
        }
    }

    /// Revealed with a matching hash, so the bid may enter settlement.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.committed && self.revealed && self.hash_matched
    }

    /// Settlement has decided what happens to this deposit.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.disposition.is_some()
    }
}
