//! # sealbid-settlement
//!
//! **Finality Plane**: rate snapshots, quote → base conversion, winner
//! selection, refunds, seizures, and the conservation invariant.
//!
//! ## Architecture
//!
//! The Finality Plane receives a ready [`BidderLedger`](sealbid_ingress::BidderLedger)
//! and a rate snapshot, and:
//! 1. Converts every eligible reveal into a required deposit
//! 2. Picks the winner among bidders whose deposits cover their bids
//! 3. Plans refunds and seizures for every committed deposit
//! 4. Checks the plan against the conservation identity
//! 5. Writes the plan into the ledger
//!
//! Refund transfers through a [`FundsSink`] are the caller's last step,
//! after all state is final.

pub mod conversion;
pub mod engine;
pub mod funds;
pub mod oracle;
pub mod supply_conservation;

pub use conversion::required_deposit;
pub use engine::{PlannedDeposit, SettlementEngine, SettlementPlan, WinningBid};
pub use funds::{FundsSink, RecordingFundsSink};
pub use oracle::{ExchangeRateProvider, InMemoryRateOracle};
pub use supply_conservation::SupplyConservation;
