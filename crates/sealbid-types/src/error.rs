//! Error types for the SealBid auction engine.
//!
//! All errors use the `SB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Phase gate errors
//! - 2xx: Ledger / registration errors
//! - 3xx: Commitment / reveal errors
//! - 4xx: Exchange rate errors
//! - 5xx: Settlement errors
//! - 8xx: Security errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AccountId, Gate};

/// Central error enum for all SealBid operations.
#[derive(Debug, Error)]
pub enum SealbidError {
    // =================================================================
    // Phase Gate Errors (1xx)
    // =================================================================
    /// The operation is not permitted because its gate has closed.
    #[error("SB_ERR_100: {gate} gate is closed")]
    PhaseViolation { gate: Gate },

    /// The round has settled; bidder operations wait for the next round.
    #[error("SB_ERR_101: Round already settled")]
    RoundSettled,

    // =================================================================
    // Ledger Errors (2xx)
    // =================================================================
    /// The identity already has a bidder record this round.
    #[error("SB_ERR_200: Bidder already registered: {0}")]
    DuplicateRegistration(AccountId),

    /// The identity has no bidder record this round.
    #[error("SB_ERR_201: Bidder not registered: {0}")]
    NotRegistered(AccountId),

    /// A deposit or bid amount failed validation (negative, etc.).
    #[error("SB_ERR_202: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // =================================================================
    // Commitment / Reveal Errors (3xx)
    // =================================================================
    /// The bidder already submitted a commitment.
    #[error("SB_ERR_300: Bidder already committed: {0}")]
    AlreadyCommitted(AccountId),

    /// The bidder tried to reveal without a commitment on file.
    #[error("SB_ERR_301: Bidder has not committed: {0}")]
    NotCommitted(AccountId),

    /// The bidder already revealed; the reveal is final.
    #[error("SB_ERR_302: Bidder already revealed: {0}")]
    AlreadyRevealed(AccountId),

    // =================================================================
    // Exchange Rate Errors (4xx)
    // =================================================================
    /// No usable exchange rate snapshot (zero means unknown).
    #[error("SB_ERR_400: Exchange rate unavailable")]
    RateUnavailable,

    /// A required collaborator has not been wired in by the operator.
    #[error("SB_ERR_401: {component} not configured")]
    ProviderNotConfigured { component: &'static str },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    /// A checked multiply/divide/subtract overflowed or underflowed.
    #[error("SB_ERR_500: Arithmetic overflow: {reason}")]
    ArithmeticOverflow { reason: String },

    /// Conservation invariant violated: value was created or destroyed.
    #[error("SB_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // Security Errors (8xx)
    // =================================================================
    /// An operator-only action was attempted by somebody else.
    #[error("SB_ERR_800: Unauthorized caller: {caller}")]
    Unauthorized { caller: AccountId },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, bad values, etc.).
    #[error("SB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SealbidError>;

impl From<serde_json::Error> for SealbidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl SealbidError {
    /// Shorthand for an [`SealbidError::ArithmeticOverflow`].
    pub fn overflow(reason: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            reason: reason.into(),
        }
    }
}
