//! Commitment hashing: binds a hidden bid to a nonce and an identity.
//!
//! The same function runs on both sides of the protocol: bidder tooling
//! calls it to build the digest it submits at commit time, and the ledger
//! calls it again at reveal time to check the disclosed values.
//!
//! Preimage layout (field order is part of the protocol and must never
//! change, or every outstanding commitment becomes unverifiable):
//!
//! ```text
//! "sealbid:commitment:v1:" || len(bid) as u64 LE || bid (normalized decimal)
//!                          || nonce (32 bytes) || identity (16 bytes)
//! ```

use sealbid_types::{AccountId, CommitmentDigest, Nonce, Quantity, constants};
use sha2::{Digest, Sha256};

/// Deterministic, side-effect-free commitment function.
///
/// Implementations must be collision resistant: two distinct
/// `(bid, nonce)` pairs for the same identity must not plausibly produce
/// the same digest.
pub trait CommitmentVerifier {
    /// Hash `(bid, nonce, bidder)` in canonical order.
    fn compute_commitment(
        &self,
        bid: Quantity,
        nonce: &Nonce,
        bidder: AccountId,
    ) -> CommitmentDigest;

    /// Whether the disclosed values reproduce `commitment`.
    fn verify(
        &self,
        commitment: &CommitmentDigest,
        bid: Quantity,
        nonce: &Nonce,
        bidder: AccountId,
    ) -> bool {
        self.compute_commitment(bid, nonce, bidder) == *commitment
    }
}

/// Default verifier: domain-separated SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256CommitmentVerifier;

impl CommitmentVerifier for Sha256CommitmentVerifier {
    fn compute_commitment(
        &self,
        bid: Quantity,
        nonce: &Nonce,
        bidder: AccountId,
    ) -> CommitmentDigest {
        // Normalize so that 50 and 50.00 commit to the same value.
        let bid_repr = bid.normalize().to_string();

        let mut hasher = Sha256::new();
        hasher.update(constants::COMMITMENT_DOMAIN);
        hasher.update((bid_repr.len() as u64).to_le_bytes());
        hasher.update(bid_repr.as_bytes());
        hasher.update(nonce.as_bytes());
        hasher.update(bidder.as_bytes());

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        CommitmentDigest(digest)
    }
}

/// Bidder-side helper: build a commitment with the default verifier.
#[must_use]
pub fn compute_commitment(bid: Quantity, nonce: &Nonce, bidder: AccountId) -> CommitmentDigest {
    Sha256CommitmentVerifier.compute_commitment(bid, nonce, bidder)
}
