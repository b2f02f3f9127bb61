//! Registration and commitment gates.
//!
//! Two orthogonal one-way switches. Each starts OPEN and is closed by an
//! operator call; neither can be reopened except by a full auction reset.
//! Reveal has no gate: a committed bidder may reveal at any time, even
//! while commitments are still being accepted.

use sealbid_types::{Gate, Result, SealbidError};

/// The pair of gates controlling `register` and `commit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseGates {
    registration_closed: bool,
    commitment_closed: bool,
}

impl PhaseGates {
    /// Both gates open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_closed(&self, gate: Gate) -> bool {
        match gate {
            Gate::Registration => self.registration_closed,
            Gate::Commitment => self.commitment_closed,
        }
    }

    #[must_use]
    pub fn registration_closed(&self) -> bool {
        self.registration_closed
    }

    #[must_use]
    pub fn commitment_closed(&self) -> bool {
        self.commitment_closed
    }

    /// Guard an operation behind `gate`. Returns `Ok(())` while it is open,
    /// or [`SealbidError::PhaseViolation`] once it has closed.
    pub fn check_open(&self, gate: Gate) -> Result<()> {
        if self.is_closed(gate) {
            Err(SealbidError::PhaseViolation { gate })
        } else {
            Ok(())
        }
    }

    /// Close `gate`. Closing twice is a phase violation.
    pub fn close(&mut self, gate: Gate) -> Result<()> {
        self.check_open(gate)?;
        match gate {
            Gate::Registration => self.registration_closed = true,
            Gate::Commitment => self.commitment_closed = true,
        }
        tracing::info!(%gate, "Gate closed");
        Ok(())
    }

    /// Reopen both gates for a new round.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
