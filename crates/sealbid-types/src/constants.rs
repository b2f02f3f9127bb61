//! System-wide constants for the SealBid auction engine.

/// Default number of base minor units per whole base unit.
///
/// Deposits are denominated in base minor units; a bid of `q` quote units at
/// rate `r` (quote per whole base unit) requires `floor(q * BASE_SCALE / r)`.
pub const DEFAULT_BASE_SCALE: u64 = 100;

/// Default fee the rate provider charges for one refresh.
pub const DEFAULT_REFRESH_FEE: u64 = 1;

/// Default base (escrow) asset symbol.
pub const DEFAULT_BASE_ASSET: &str = "ETH";

/// Default quote (bid) asset symbol.
pub const DEFAULT_QUOTE_ASSET: &str = "USD";

/// Domain tag prefixed to every commitment preimage.
///
/// Changing this invalidates every outstanding commitment.
pub const COMMITMENT_DOMAIN: &[u8] = b"sealbid:commitment:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SealBid";
