//! # sealbid-types
//!
//! Shared types, errors, and configuration for the **SealBid** auction engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`RoundId`], [`CommitmentDigest`], [`Nonce`]
//! - **Money**: [`Amount`] (base minor units), [`Quantity`] (quote units)
//! - **Bidder model**: [`BidderRecord`], [`Disposition`]
//! - **Phase gates**: [`Gate`]
//! - **Exchange rate**: [`ExchangeRate`], [`RefreshOutcome`]
//! - **Settlement results**: [`SettlementReport`], [`SettlementStatus`], [`ResetReport`]
//! - **Configuration**: [`AuctionConfig`]
//! - **Errors**: [`SealbidError`] with `SB_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod amount;
pub mod bidder;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod phase;
pub mod rate;
pub mod settlement;

pub use amount::*;
pub use bidder::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use phase::*;
pub use rate::*;
pub use settlement::*;

// Constants are accessed via `sealbid_types::constants::FOO`
// (not re-exported to avoid name collisions).
