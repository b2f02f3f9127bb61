//! # sealbid-auction
//!
//! Sealed-bid commit–reveal auction over escrowed deposits.
//!
//! Bids are quoted in one currency, deposits are escrowed in another, and
//! the winner pays the converted price out of their deposit. The
//! [`Auction`] facade wires the planes together:
//!
//! - **Bidder Plane** (`sealbid-ingress`): commitments, phase gates, ledger
//! - **Finality Plane** (`sealbid-settlement`): rate snapshot, conversion,
//!   winner selection, refunds, seizures, conservation
//!
//! ## Round Lifecycle
//!
//! ```text
//!  register ──▶ commit ──▶ reveal ──▶ compute_winner ──▶ reset_auction
//!     │           │                        │                  │
//!  close_registration  close_commitment    │ refunds paid     │ winners kept,
//!                                          ▼ via FundsSink    ▼ next round
//! ```
//!
//! Reveal is not gated: it is accepted at any time after commit.

pub mod auction;

pub use auction::Auction;
