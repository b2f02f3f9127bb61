//! # sealbid-ingress
//!
//! **Bidder Plane**: everything a bid passes through before settlement.
//!
//! ## Architecture
//!
//! 1. **CommitmentVerifier**: pure hash binding (bid, nonce, identity)
//! 2. **PhaseGates**: two independent one-way gates (registration, commitment)
//! 3. **BidderLedger**: per-identity records in registration order
//!
//! ## Bid Flow
//!
//! ```text
//! register ─▶ PhaseGates(REGISTRATION) ─▶ BidderLedger
//! commit   ─▶ PhaseGates(COMMITMENT)   ─▶ BidderLedger (digest + deposit)
//! reveal   ─▶ CommitmentVerifier       ─▶ BidderLedger (bid + hash match)
//! ```
//!
//! Reveal is not gated: it is accepted while commitments are
//! still open, so an early reveal is visible to bidders who have not yet
//! committed.

pub mod commitment;
pub mod gates;
pub mod ledger;

pub use commitment::{CommitmentVerifier, Sha256CommitmentVerifier, compute_commitment};
pub use gates::PhaseGates;
pub use ledger::BidderLedger;
