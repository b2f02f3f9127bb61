//! Escrow conservation invariant checker.
//!
//! Mathematical invariant enforced for every round:
//! ```text
//! Σ(deposits) == Σ(refunds) + Σ(retained) + Σ(still held in escrow)
//! ```
//!
//! Deposits enter at commit time; settlement splits each one into a refund
//! and a retained part; reset books anything still held as retained. If the
//! identity ever breaks, value was created or destroyed and the engine
//! refuses to continue.

use sealbid_types::{Amount, Result, SealbidError, SettlementReport};

/// Per-round flow totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyConservation {
    deposited: Amount,
    refunded: Amount,
    retained: Amount,
}

impl SupplyConservation {
    /// Create a tracker with all totals at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if recording `amount` as a deposit would overflow.
    pub fn check_deposit(&self, amount: Amount) -> Result<()> {
        Self::add(self.deposited, amount, "deposits").map(|_| ())
    }

    /// Record a deposit entering escrow.
    pub fn record_deposit(&mut self, amount: Amount) -> Result<()> {
        self.deposited = Self::add(self.deposited, amount, "deposits")?;
        Ok(())
    }

    /// Record a refund leaving escrow.
    pub fn record_refund(&mut self, amount: Amount) -> Result<()> {
        self.refunded = Self::add(self.refunded, amount, "refunds")?;
        Ok(())
    }

    /// Record value kept by the engine (price paid or forfeiture).
    pub fn record_retained(&mut self, amount: Amount) -> Result<()> {
        self.retained = Self::add(self.retained, amount, "retained")?;
        Ok(())
    }

    /// Record every flow of a settled round.
    pub fn record_settlement(&mut self, report: &SettlementReport) -> Result<()> {
        let refunded = Self::add(self.refunded, report.total_refunded, "refunds")?;
        let retained = Self::add(self.retained, report.total_retained, "retained")?;
        self.refunded = refunded;
        self.retained = retained;
        Ok(())
    }

    /// Amount that should still be in escrow: deposits − refunds − retained.
    pub fn expected_held(&self) -> Result<Amount> {
        self.deposited
            .checked_sub(self.refunded)
            .and_then(|v| v.checked_sub(self.retained))
            .ok_or_else(|| SealbidError::overflow("expected escrow balance"))
    }

    /// Verify that the escrow actually held matches the flows recorded.
    ///
    /// # Errors
    /// Returns [`SealbidError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, actual_held: Amount) -> Result<()> {
        let expected = self.expected_held()?;
        if actual_held != expected {
            return Err(SealbidError::SupplyInvariantViolation {
                reason: format!(
                    "escrow holds {actual_held}, expected {expected} \
                     (deposited={}, refunded={}, retained={})",
                    self.deposited, self.refunded, self.retained
                ),
            });
        }
        Ok(())
    }

    /// Check one report in isolation: every outcome splits its deposit
    /// exactly, and the totals add up.
    pub fn verify_report(report: &SettlementReport) -> Result<()> {
        for outcome in &report.outcomes {
            let split = Self::add(outcome.refund, outcome.retained, "outcome split")?;
            if split != outcome.deposit {
                return Err(SealbidError::SupplyInvariantViolation {
                    reason: format!(
                        "{}: refund {} + retained {} != deposit {}",
                        outcome.account, outcome.refund, outcome.retained, outcome.deposit
                    ),
                });
            }
        }
        let out = Self::add(report.total_refunded, report.total_retained, "report totals")?;
        if out != report.total_deposited {
            return Err(SealbidError::SupplyInvariantViolation {
                reason: format!(
                    "{}: refunded {} + retained {} != deposited {}",
                    report.round, report.total_refunded, report.total_retained,
                    report.total_deposited
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_deposited(&self) -> Amount {
        self.deposited
    }

    #[must_use]
    pub fn total_refunded(&self) -> Amount {
        self.refunded
    }

    #[must_use]
    pub fn total_retained(&self) -> Amount {
        self.retained
    }

    /// Start a new round.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn add(a: Amount, b: Amount, what: &str) -> Result<Amount> {
        a.checked_add(b)
            .ok_or_else(|| SealbidError::overflow(format!("{what}: {a} + {b}")))
    }
}
