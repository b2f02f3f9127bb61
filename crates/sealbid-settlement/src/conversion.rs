//! Quote → base conversion.
//!
//! ```text
//! required = floor(bid * base_scale / rate)
//! ```
//!
//! Rounded toward zero, like the rate itself. The multiply happens before
//! the divide so that sub-unit quotients are not lost: at rate 200 and
//! scale 100 a bid of 50 requires 25 minor units, not 0.
//!
//! For a positive integer `r`, `floor(x / r) == floor(floor(x) / r)`, so the
//! division is done in exact integer arithmetic on the truncated product.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use sealbid_types::{Amount, ExchangeRate, Quantity, Result, SealbidError, ensure_non_negative};

/// Base minor units a deposit must cover for `bid` at `rate`.
///
/// # Errors
/// - `RateUnavailable` if `rate` is unknown (zero)
/// - `InvalidAmount` if `bid` is negative
/// - `ArithmeticOverflow` if the scaled bid does not fit
pub fn required_deposit(bid: Quantity, rate: ExchangeRate, base_scale: u64) -> Result<Amount> {
    if rate.is_unknown() {
        return Err(SealbidError::RateUnavailable);
    }
    ensure_non_negative(bid, "bid")?;

    let scaled = bid
        .checked_mul(Decimal::from(base_scale))
        .ok_or_else(|| SealbidError::overflow(format!("{bid} * {base_scale}")))?;
    let whole = scaled
        .trunc()
        .to_i128()
        .ok_or_else(|| SealbidError::overflow(format!("{scaled} does not fit in i128")))?;
    let required = whole / i128::from(rate.get());

    Decimal::try_from_i128_with_scale(required, 0)
        .map_err(|e| SealbidError::overflow(format!("required deposit {required}: {e}")))
}

/// Whether `deposit` covers the converted price of `bid`.
pub fn covers(deposit: Amount, bid: Quantity, rate: ExchangeRate, base_scale: u64) -> Result<bool> {
    Ok(deposit >= required_deposit(bid, rate, base_scale)?)
}
