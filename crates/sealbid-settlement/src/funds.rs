//! Outbound fund transfers.
//!
//! Refunds leave the engine through a [`FundsSink`]. The sink is the only
//! external effect of settlement and is invoked strictly after the ledger,
//! the dispositions, the winner list and the conservation totals are final.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sealbid_types::{AccountId, Amount};

/// Receiver of refund transfers (a payment rail, a wallet service, ...).
pub trait FundsSink {
    /// Move `amount` base minor units to `to`.
    fn transfer(&mut self, to: AccountId, amount: Amount);
}

/// Sink that just remembers every transfer, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingFundsSink {
    transfers: Vec<(AccountId, Amount)>,
}

impl RecordingFundsSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transfer in execution order.
    #[must_use]
    pub fn transfers(&self) -> &[(AccountId, Amount)] {
        &self.transfers
    }

    /// Sum transferred to one account.
    #[must_use]
    pub fn total_to(&self, account: AccountId) -> Amount {
        self.transfers
            .iter()
            .filter(|(to, _)| *to == account)
            .fold(Decimal::ZERO, |acc, (_, amount)| acc.saturating_add(*amount))
    }

    /// Per-account totals.
    #[must_use]
    pub fn totals(&self) -> HashMap<AccountId, Amount> {
        let mut totals = HashMap::new();
        for (to, amount) in &self.transfers {
            let entry: &mut Amount = totals.entry(*to).or_insert(Decimal::ZERO);
            *entry = entry.saturating_add(*amount);
        }
        totals
    }
}

impl FundsSink for RecordingFundsSink {
    fn transfer(&mut self, to: AccountId, amount: Amount) {
        tracing::debug!(to = %to, %amount, "Refund transferred");
        self.transfers.push((to, amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut sink = RecordingFundsSink::new();
        let a = AccountId::new();
        let b = AccountId::new();
        sink.transfer(a, Decimal::from(100));
        sink.transfer(b, Decimal::from(155));
        assert_eq!(
            sink.transfers(),
            &[(a, Decimal::from(100)), (b, Decimal::from(155))]
        );
    }

    #[test]
    fn totals_per_account() {
        let mut sink = RecordingFundsSink::new();
        let a = AccountId::new();
        sink.transfer(a, Decimal::from(1));
        sink.transfer(a, Decimal::from(2));
        assert_eq!(sink.total_to(a), Decimal::from(3));
        assert_eq!(sink.total_to(AccountId::new()), Decimal::ZERO);
        assert_eq!(sink.totals().get(&a), Some(&Decimal::from(3)));
    }
}
