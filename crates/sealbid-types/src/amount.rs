//! Monetary value types.
//!
//! Deposits are held in base minor units ([`Amount`]); bids are quoted in
//! quote units ([`Quantity`]). Both are exact decimals and must never be
//! negative.

use rust_decimal::Decimal;

use crate::{Result, SealbidError};

/// Base-currency value in minor units (the escrow unit).
pub type Amount = Decimal;

/// Quote-currency value (the unit bids are denominated in).
pub type Quantity = Decimal;

/// Reject negative amounts before they touch any accounting.
///
/// # Errors
/// Returns [`SealbidError::InvalidAmount`] if `value < 0`.
pub fn ensure_non_negative(value: Decimal, what: &str) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SealbidError::InvalidAmount {
            reason: format!("{what} must be non-negative, got {value}"),
        });
    }
    Ok(())
}
