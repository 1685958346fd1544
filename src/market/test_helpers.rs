// Scriptable asset index for engine tests.
// Only compiled under #[cfg(test)].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::IndexError;
use crate::market::AssetIndex;
use crate::types::{Asset, PriceSignals};

/// Fixed inventory and per-asset signals; records peak in-flight price queries.
#[derive(Default)]
pub struct FakeIndex {
    pub assets: Vec<Asset>,
    pub signals: HashMap<String, PriceSignals>,
    /// Asset id whose price query fails.
    pub fail: Option<String>,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl FakeIndex {
    pub fn with(mut self, id: &str, order: u64, item: u64) -> Self {
        self.signals.insert(
            id.to_string(),
            PriceSignals {
                order_price: U256::from(order),
                item_price: U256::from(item),
            },
        );
        self
    }

    pub fn owning(mut self, assets: Vec<Asset>) -> Self {
        self.assets = assets;
        self
    }
}

#[async_trait]
impl AssetIndex for FakeIndex {
    async fn owned_assets(&self, _owner: Address) -> Result<Vec<Asset>, IndexError> {
        Ok(self.assets.clone())
    }

    async fn price_signals(&self, asset: &Asset) -> Result<PriceSignals, IndexError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.as_deref() == Some(asset.id.as_str()) {
            return Err(IndexError::Decode(format!("no data for {}", asset.id)));
        }
        Ok(self.signals.get(&asset.id).copied().unwrap_or_default())
    }
}
