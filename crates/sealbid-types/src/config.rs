//! Configuration for a SealBid auction.

use serde::{Deserialize, Serialize};

use crate::{Result, SealbidError, constants};

/// Per-auction configuration.
///
/// Loaded from JSON by hosts; every field has a default so a partial
/// document is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionConfig {
    /// Escrow asset that deposits are paid in (e.g., "ETH").
    pub base_asset: String,
    /// Asset the bids are denominated in (e.g., "USD").
    pub quote_asset: String,
    /// Base minor units per whole base unit.
    pub base_scale: u64,
    /// Fee budget the operator attaches to each rate refresh request.
    pub refresh_fee: u64,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            base_asset: constants::DEFAULT_BASE_ASSET.to_string(),
            quote_asset: constants::DEFAULT_QUOTE_ASSET.to_string(),
            base_scale: constants::DEFAULT_BASE_SCALE,
            refresh_fee: constants::DEFAULT_REFRESH_FEE,
        }
    }
}

impl AuctionConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.base_scale == 0 {
            return Err(SealbidError::Configuration(
                "base_scale must be > 0".to_string(),
            ));
        }
        if self.base_asset.trim().is_empty() || self.quote_asset.trim().is_empty() {
            return Err(SealbidError::Configuration(
                "base_asset and quote_asset must be non-empty".to_string(),
            ));
        }
        if self.base_asset == self.quote_asset {
            return Err(SealbidError::Configuration(format!(
                "base and quote asset must differ (both {})",
                self.base_asset
            )));
        }
        Ok(())
    }

    /// Pair symbol, e.g. "ETH/USD".
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base_asset, self.quote_asset)
    }
}
