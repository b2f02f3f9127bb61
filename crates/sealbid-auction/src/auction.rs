//! The auction facade: operator, bidder, and query surfaces.
//!
//! [`Auction`] owns one round's state and the injected collaborators
//! (commitment verifier, rate provider, funds sink). Every call takes the
//! caller's identity; administrative calls are rejected with
//! `Unauthorized` unless the caller is the operator fixed at construction.
//!
//! Every mutating call validates all preconditions first and only then
//! writes, so an error leaves the auction exactly as it was.

use std::fmt;

use rust_decimal::Decimal;
use sealbid_ingress::{BidderLedger, CommitmentVerifier, PhaseGates, Sha256CommitmentVerifier};
use sealbid_settlement::{ExchangeRateProvider, FundsSink, SettlementEngine, SupplyConservation};
use sealbid_types::{
    AccountId, Amount, AuctionConfig, BidderRecord, CommitmentDigest, ExchangeRate, Gate, Nonce,
    Quantity, RefreshOutcome, ResetReport, Result, RoundId, SealbidError, SettlementReport,
    SettlementStatus, constants,
};

/// A sealed-bid commit–reveal auction with escrowed, currency-converted
/// deposits.
pub struct Auction<F: FundsSink> {
    operator: AccountId,
    config: AuctionConfig,
    engine: SettlementEngine,
    gates: PhaseGates,
    ledger: BidderLedger,
    verifier: Box<dyn CommitmentVerifier>,
    rate_provider: Option<Box<dyn ExchangeRateProvider>>,
    /// Last snapshot read from the provider. Settlement uses only this.
    exchange_rate: ExchangeRate,
    conservation: SupplyConservation,
    funds: F,
    /// Append-only across rounds.
    winners: Vec<AccountId>,
    round: RoundId,
    /// Set once the current round has settled.
    last_settlement: Option<SettlementReport>,
}

impl<F: FundsSink> Auction<F> {
    /// Create an auction run by `operator`, with the SHA-256 commitment
    /// verifier and no rate provider.
    ///
    /// # Errors
    /// `Configuration` if `config` does not validate.
    pub fn new(operator: AccountId, config: AuctionConfig, funds: F) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            %operator,
            market = %config.symbol(),
            base_scale = config.base_scale,
            "Auction created"
        );
        Ok(Self {
            operator,
            engine: SettlementEngine::new(config.base_scale),
            config,
            gates: PhaseGates::new(),
            ledger: BidderLedger::new(),
            verifier: Box::new(Sha256CommitmentVerifier),
            rate_provider: None,
            exchange_rate: ExchangeRate::UNKNOWN,
            conservation: SupplyConservation::new(),
            funds,
            winners: Vec::new(),
            round: RoundId::default(),
            last_settlement: None,
        })
    }

    // =================================================================
    // Administrative surface
    // =================================================================

    /// Swap the commitment verifier. Existing commitments are checked with
    /// whatever verifier is installed at reveal time.
    pub fn set_commitment_verifier(
        &mut self,
        caller: AccountId,
        verifier: Box<dyn CommitmentVerifier>,
    ) -> Result<()> {
        self.authorize(caller)?;
        self.verifier = verifier;
        tracing::info!(round = %self.round, "Commitment verifier replaced");
        Ok(())
    }

    /// Install or replace the exchange rate provider. The current snapshot
    /// is kept until the next refresh or sync.
    pub fn set_exchange_rate_provider(
        &mut self,
        caller: AccountId,
        provider: Box<dyn ExchangeRateProvider>,
    ) -> Result<()> {
        self.authorize(caller)?;
        self.rate_provider = Some(provider);
        tracing::info!(round = %self.round, "Exchange rate provider replaced");
        Ok(())
    }

    pub fn close_registration(&mut self, caller: AccountId) -> Result<()> {
        self.authorize(caller)?;
        self.gates.close(Gate::Registration)
    }

    pub fn close_commitment(&mut self, caller: AccountId) -> Result<()> {
        self.authorize(caller)?;
        self.gates.close(Gate::Commitment)
    }

    /// Ask the provider for a fresh rate, paying up to `fee_budget`, then
    /// snapshot whatever it reports as its last value.
    ///
    /// A rejected request is not an error: the outcome is returned and the
    /// snapshot stays as it was.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the operator
    /// - `ProviderNotConfigured` if no provider is installed
    pub fn request_rate_refresh(
        &mut self,
        caller: AccountId,
        fee_budget: u64,
    ) -> Result<RefreshOutcome> {
        self.authorize(caller)?;
        let provider = self.provider_mut()?;
        let outcome = provider.request_refresh(fee_budget);
        match &outcome {
            RefreshOutcome::Accepted => {
                let rate = provider.read_last();
                self.exchange_rate = rate;
                tracing::info!(round = %self.round, %rate, fee_budget, "Exchange rate refreshed");
            }
            RefreshOutcome::Rejected { reason } => {
                tracing::warn!(
                    round = %self.round,
                    fee_budget,
                    %reason,
                    "Exchange rate refresh rejected"
                );
            }
        }
        Ok(outcome)
    }

    /// [`request_rate_refresh`](Self::request_rate_refresh) with the
    /// configured fee.
    pub fn refresh_rate(&mut self, caller: AccountId) -> Result<RefreshOutcome> {
        let fee = self.config.refresh_fee;
        self.request_rate_refresh(caller, fee)
    }

    /// Re-read the provider's last value without paying for a refresh.
    /// For providers that deliver some time after the request.
    pub fn sync_rate(&mut self, caller: AccountId) -> Result<ExchangeRate> {
        self.authorize(caller)?;
        let rate = self.provider_mut()?.read_last();
        self.exchange_rate = rate;
        tracing::debug!(round = %self.round, %rate, "Exchange rate synced");
        Ok(rate)
    }

    /// Settle the round: pick the winner, refund and seize deposits, and
    /// pay out refunds.
    ///
    /// Returns `NotReady` while some registrant has not committed and the
    /// commitment gate is still open, and `AlreadySettled` if this round
    /// has settled before. Neither changes anything.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the operator
    /// - `RateUnavailable` if no rate has been fetched
    /// - `ArithmeticOverflow` / `SupplyInvariantViolation` from settlement
    pub fn compute_winner(&mut self, caller: AccountId) -> Result<SettlementStatus> {
        self.authorize(caller)?;
        if !SettlementEngine::is_ready(&self.ledger, &self.gates) {
            tracing::debug!(
                round = %self.round,
                registered = self.ledger.total_registered(),
                committed = self.ledger.total_committed(),
                "Settlement not ready"
            );
            return Ok(SettlementStatus::NotReady);
        }
        if self.last_settlement.is_some() {
            return Ok(SettlementStatus::AlreadySettled);
        }

        // Checks: plan and project conservation before touching anything.
        let plan = self
            .engine
            .plan(&self.ledger, self.exchange_rate, self.round)?;
        let (deposited, refunded, retained) = plan.totals()?;
        let mut projected = self.conservation.clone();
        projected.record_refund(refunded)?;
        projected.record_retained(retained)?;
        let still_held = self
            .ledger
            .total_escrowed()
            .checked_sub(deposited)
            .ok_or_else(|| SealbidError::overflow("escrow after settlement"))?;
        projected.verify(still_held)?;

        // Effects.
        let report = self.engine.apply(plan, &mut self.ledger)?;
        self.conservation.record_settlement(&report)?;
        self.conservation.verify(self.ledger.total_escrowed())?;
        if let Some(winner) = report.winner {
            self.winners.push(winner);
        }
        self.last_settlement = Some(report.clone());

        // Interactions.
        for (to, amount) in report.payouts() {
            self.funds.transfer(to, amount);
        }

        tracing::info!(
            round = %self.round,
            winner = ?report.winner,
            payouts = report.payouts().count(),
            seized = %report.total_forfeited(),
            "Round settled"
        );
        Ok(SettlementStatus::Settled(report))
    }

    /// Close out the round and open the next one.
    ///
    /// Removes every bidder record and resets counters, gates, and the rate
    /// snapshot. Winner history is kept. Deposits still held (a round that
    /// never settled) are booked as seized before the ledger is cleared.
    pub fn reset_auction(&mut self, caller: AccountId) -> Result<ResetReport> {
        self.authorize(caller)?;

        let held = self.ledger.total_escrowed();
        self.conservation.verify(held)?;
        let mut closing = self.conservation.clone();
        closing.record_retained(held)?;
        closing.verify(Decimal::ZERO)?;

        if held > Decimal::ZERO {
            tracing::warn!(
                round = %self.round,
                %held,
                "Unsettled deposits seized at reset"
            );
        }

        let bidders_cleared = self.ledger.clear();
        self.gates.reset();
        self.exchange_rate = ExchangeRate::UNKNOWN;
        self.conservation.reset();
        self.last_settlement = None;
        let closed_round = self.round;
        self.round = closed_round.next();

        tracing::info!(
            closed = %closed_round,
            opened = %self.round,
            bidders_cleared,
            winners = self.winners.len(),
            "Auction reset"
        );
        Ok(ResetReport {
            closed_round,
            new_round: self.round,
            bidders_cleared,
            unsettled_seized: held,
        })
    }

    // =================================================================
    // Bidder surface
    // =================================================================
    //
    // All three are refused with `RoundSettled` once the round has settled.

    pub fn register(&mut self, caller: AccountId) -> Result<()> {
        self.check_unsettled()?;
        self.ledger.register(&self.gates, caller)
    }

    /// Submit a sealed bid with its escrowed deposit (base minor units).
    pub fn commit(
        &mut self,
        caller: AccountId,
        digest: CommitmentDigest,
        deposit: Amount,
    ) -> Result<()> {
        self.check_unsettled()?;
        self.conservation.check_deposit(deposit)?;
        self.ledger.commit(&self.gates, caller, digest, deposit)?;
        self.conservation.record_deposit(deposit)
    }

    /// Open a sealed bid. Returns whether it matched the commitment; a
    /// mismatch is final and forfeits the deposit at settlement.
    pub fn reveal(&mut self, caller: AccountId, bid: Quantity, nonce: &Nonce) -> Result<bool> {
        self.check_unsettled()?;
        self.ledger.reveal(self.verifier.as_ref(), caller, bid, nonce)
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn exchange_rate(&self) -> ExchangeRate {
        self.exchange_rate
    }

    #[must_use]
    pub fn total_registered(&self) -> usize {
        self.ledger.total_registered()
    }

    #[must_use]
    pub fn total_committed(&self) -> usize {
        self.ledger.total_committed()
    }

    #[must_use]
    pub fn total_revealed(&self) -> usize {
        self.ledger.total_revealed()
    }

    /// Every round's winner, oldest first.
    #[must_use]
    pub fn winners(&self) -> &[AccountId] {
        &self.winners
    }

    #[must_use]
    pub fn bidder(&self, account: AccountId) -> Option<&BidderRecord> {
        self.ledger.get(account)
    }

    #[must_use]
    pub fn round(&self) -> RoundId {
        self.round
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.last_settlement.is_some()
    }

    #[must_use]
    pub fn registration_closed(&self) -> bool {
        self.gates.registration_closed()
    }

    #[must_use]
    pub fn commitment_closed(&self) -> bool {
        self.gates.commitment_closed()
    }

    /// Deposits currently held in escrow.
    #[must_use]
    pub fn total_escrowed(&self) -> Amount {
        self.ledger.total_escrowed()
    }

    /// Deposits forfeited in this round's settlement.
    #[must_use]
    pub fn total_seized(&self) -> Amount {
        self.last_settlement
            .as_ref()
            .map_or(Decimal::ZERO, SettlementReport::total_forfeited)
    }

    #[must_use]
    pub fn last_settlement(&self) -> Option<&SettlementReport> {
        self.last_settlement.as_ref()
    }

    #[must_use]
    pub fn conservation(&self) -> &SupplyConservation {
        &self.conservation
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    #[must_use]
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    #[must_use]
    pub fn funds(&self) -> &F {
        &self.funds
    }

    fn authorize(&self, caller: AccountId) -> Result<()> {
        if caller != self.operator {
            tracing::warn!(%caller, "Unauthorized administrative call");
            return Err(SealbidError::Unauthorized { caller });
        }
        Ok(())
    }

    fn check_unsettled(&self) -> Result<()> {
        if self.last_settlement.is_some() {
            return Err(SealbidError::RoundSettled);
        }
        Ok(())
    }

    fn provider_mut(&mut self) -> Result<&mut Box<dyn ExchangeRateProvider>> {
        self.rate_provider
            .as_mut()
            .ok_or(SealbidError::ProviderNotConfigured {
                component: "exchange rate provider",
            })
    }
}

impl<F: FundsSink + fmt::Debug> fmt::Debug for Auction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auction")
            .field("operator", &self.operator)
            .field("config", &self.config)
            .field("round", &self.round)
            .field("gates", &self.gates)
            .field("ledger", &self.ledger)
            .field("exchange_rate", &self.exchange_rate)
            .field("has_rate_provider", &self.rate_provider.is_some())
            .field("conservation", &self.conservation)
            .field("winners", &self.winners)
            .field("settled", &self.last_settlement.is_some())
            .field("funds", &self.funds)
            .finish_non_exhaustive()
    }
}
