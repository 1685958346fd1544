pub mod index;
#[cfg(test)]
pub mod test_helpers;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::error::IndexError;
use crate::types::{Asset, PriceSignals};

/// Off-chain asset index: ownership and the two price signals.
#[async_trait]
pub trait AssetIndex: Send + Sync {
    /// Every asset currently owned by `owner`. May be empty.
    async fn owned_assets(&self, owner: Address) -> Result<Vec<Asset>, IndexError>;

    /// Cheapest open order and catalog price for the asset's item.
    /// Missing signals are zero. Implementations keep at most one request
    /// outstanding per call.
    async fn price_signals(&self, asset: &Asset) -> Result<PriceSignals, IndexError>;
}
