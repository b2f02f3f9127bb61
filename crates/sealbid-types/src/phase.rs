//! Phase gate identifiers.
//!
//! The auction has two **independent** one-way gates rather than one linear
//! phase machine: registration and commitment each close on their own
//! operator call, in either order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two auction gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gate {
    /// Controls `register`.
    Registration,
    /// Controls `commit`.
    Commitment,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration => write!(f, "REGISTRATION"),
            Self::Commitment => write!(f, "COMMITMENT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_display() {
        assert_eq!(format!("{}", Gate::Registration), "REGISTRATION");
        assert_eq!(format!("{}", Gate::Commitment), "COMMITMENT");
    }

    #[test]
    fn gate_serde_roundtrip() {
        let json = serde_json::to_string(&Gate::Commitment).unwrap();
        let back: Gate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gate::Commitment);
    }
}
