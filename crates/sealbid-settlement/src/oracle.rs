//! Exchange rate provider interface and an in-process implementation.
//!
//! A provider is asked to refresh (fire-and-forget, paid for with a fee
//! budget) and separately read for its last known value. The engine never
//! fetches on its own during settlement; it only uses the snapshot the
//! operator took beforehand.

use rust_decimal::Decimal;
use sealbid_types::{ExchangeRate, RefreshOutcome, Result};

/// Source of quote-per-base rates.
pub trait ExchangeRateProvider {
    /// Ask for a fresh rate. Does not return it; call
    /// [`read_last`](Self::read_last) afterwards.
    fn request_refresh(&mut self, fee_budget: u64) -> RefreshOutcome;

    /// Last value fetched, rounded toward zero. May be stale or
    /// [`ExchangeRate::UNKNOWN`].
    fn read_last(&self) -> ExchangeRate;
}

/// In-process provider fed by the host.
///
/// The host [`publish`](Self::publish)es real-valued rates; a paid refresh
/// makes the most recently published (floored) value readable. With
/// deferred delivery the promotion waits for an explicit
/// [`deliver`](Self::deliver), modelling a provider that answers later.
#[derive(Debug, Clone)]
pub struct InMemoryRateOracle {
    /// Fee required per refresh.
    refresh_cost: u64,
    /// Most recent published value, not yet necessarily readable.
    staged: Option<ExchangeRate>,
    /// Value returned by `read_last`.
    last: ExchangeRate,
    /// Accepted refresh awaiting delivery.
    pending: bool,
    deferred: bool,
    fees_collected: u64,
}

impl InMemoryRateOracle {
    /// Provider that delivers immediately on every accepted refresh.
    #[must_use]
    pub fn new(refresh_cost: u64) -> Self {
        Self {
            refresh_cost,
            staged: None,
            last: ExchangeRate::UNKNOWN,
            pending: false,
            deferred: false,
            fees_collected: 0,
        }
    }

    /// Provider whose accepted refreshes only land on [`deliver`](Self::deliver).
    #[must_use]
    pub fn deferred(refresh_cost: u64) -> Self {
        Self {
            deferred: true,
            ..Self::new(refresh_cost)
        }
    }

    /// Stage a real-valued rate. Returns the floored value that a later
    /// refresh will expose.
    pub fn publish(&mut self, rate: Decimal) -> Result<ExchangeRate> {
        let floored = ExchangeRate::from_real(rate)?;
        self.staged = Some(floored);
        Ok(floored)
    }

    /// Complete an accepted refresh. Returns `true` if a value landed.
    pub fn deliver(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        match self.staged {
            Some(rate) => {
                self.last = rate;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn refresh_cost(&self) -> u64 {
        self.refresh_cost
    }

    #[must_use]
    pub fn fees_collected(&self) -> u64 {
        self.fees_collected
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

impl ExchangeRateProvider for InMemoryRateOracle {
    fn request_refresh(&mut self, fee_budget: u64) -> RefreshOutcome {
        if fee_budget < self.refresh_cost {
            return RefreshOutcome::Rejected {
                reason: format!(
                    "fee budget {fee_budget} below refresh cost {}",
                    self.refresh_cost
                ),
            };
        }
        self.fees_collected = self.fees_collected.saturating_add(self.refresh_cost);
        self.pending = true;
        if !self.deferred {
            self.deliver();
        }
        RefreshOutcome::Accepted
    }

    fn read_last(&self) -> ExchangeRate {
        self.last
    }
}
