//! Exchange rate snapshot and refresh outcome types.

use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::{Result, SealbidError};

/// Quote units per whole base unit, rounded toward zero.
///
/// `0` means "unknown": nothing has been fetched yet, or the auction was
/// reset. Conversions must refuse to divide by it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct ExchangeRate(pub u64);

impl ExchangeRate {
    /// The "nothing fetched" sentinel.
    pub const UNKNOWN: Self = Self(0);

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Floor a real-valued rate into an integer snapshot.
    ///
    /// The rounding direction matters: every downstream requirement is
    /// computed against the floored value.
    ///
    /// # Errors
    /// - `InvalidAmount` for a negative rate
    /// - `ArithmeticOverflow` if the floored value does not fit in `u64`
    pub fn from_real(rate: Decimal) -> Result<Self> {
        crate::ensure_non_negative(rate, "exchange rate")?;
        rate.trunc()
            .to_u64()
            .map(Self)
            .ok_or_else(|| SealbidError::overflow(format!("exchange rate {rate} exceeds u64")))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Answer to a rate refresh request. The rate itself is never returned
/// here; callers read it back separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    /// The provider took the request and will update its last value.
    Accepted,
    /// The provider refused, e.g. the fee budget does not cover the cost.
    Rejected { reason: String },
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}
