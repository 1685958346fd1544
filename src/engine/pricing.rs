use alloy::primitives::U256;
use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::config::PricingConfig;
use crate::error::Error;
use crate::market::AssetIndex;
use crate::math::pricing::listing_price;
use crate::types::{Asset, PriceQuotes};

/// Resolve a listing price for each asset.
///
/// At most `cfg.concurrency` assets are in flight, each with one index query
/// outstanding, which caps open queries at `cfg.concurrency`. Assets whose price
/// discounts to zero are left out. The first failed query aborts the stage.
pub async fn resolve_prices<'a, I>(
    index: &I,
    assets: impl IntoIterator<Item = &'a Asset>,
    cfg: &PricingConfig,
) -> Result<PriceQuotes, Error>
where
    I: AssetIndex + ?Sized,
{
    let assets: Vec<&Asset> = assets.into_iter().collect();

    let priced: Vec<Option<(String, U256)>> = stream::iter(assets.iter().map(|&asset| async move {
        let signals = index.price_signals(asset).await?;
        let price = listing_price(signals, cfg);
        tracing::debug!(
            asset = %asset.id,
            order = %signals.order_price,
            item = %signals.item_price,
            price = ?price,
            "priced"
        );
        Ok::<_, Error>(price.map(|p| (asset.id.clone(), p)))
    }))
    .buffer_unordered(cfg.concurrency.max(1))
    .try_collect()
    .await?;

    let quotes: PriceQuotes = priced.into_iter().flatten().collect();
    tracing::info!(assets = assets.len(), priced = quotes.len(), "prices resolved");
    Ok(quotes)
}
