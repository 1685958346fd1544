use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::chain::batch::{submit_batch, wait_all};
use crate::chain::nonce::NonceAllocator;
use crate::chain::{Chain, IMarketplace};
use crate::config::SubmitConfig;
use crate::error::Error;
use crate::types::{Inventory, OutgoingTx, PriceQuotes, TxHandle};

/// Listing transactions for one batch, before any nonce is assigned.
#[derive(Debug, Default)]
pub struct ListingPlan {
    pub txs: Vec<OutgoingTx>,
    /// Priced asset ids with no inventory entry.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ListingOutcome {
    pub handles: Vec<TxHandle>,
    pub skipped: Vec<String>,
    pub expires_at: u64,
}

/// Shared expiry for the batch: block time plus TTL.
pub fn expiration(block_timestamp: u64, ttl_secs: u64) -> u64 {
    block_timestamp.saturating_add(ttl_secs)
}

/// One `createOrder` per priced asset, in asset-id order.
/// Prices for assets missing from the inventory are skipped with a warning.
pub fn plan_listings(
    inventory: &Inventory,
    quotes: &PriceQuotes,
    marketplace: Address,
    expires_at: u64,
) -> ListingPlan {
    let mut plan = ListingPlan::default();

    for (id, price) in quotes {
        let Some(asset) = inventory.get(id) else {
            tracing::warn!(asset = %id, price = %price, "priced asset not in inventory, skipping");
            plan.skipped.push(id.clone());
            continue;
        };

        let call = IMarketplace::createOrderCall {
            nftAddress: asset.contract,
            assetId: asset.token_id,
            priceInWei: *price,
            expiresAt: U256::from(expires_at),
        };
        plan.txs.push(OutgoingTx {
            to: marketplace,
            input: call.abi_encode().into(),
            label: format!("{} ({})", asset.display_name(), asset.id),
        });
    }

    plan
}

/// Create a listing for every priced asset and wait until each is mined.
pub async fn create_listings<C: Chain + ?Sized>(
    chain: &C,
    inventory: &Inventory,
    quotes: &PriceQuotes,
    marketplace: Address,
    cfg: &SubmitConfig,
) -> Result<ListingOutcome, Error> {
    let now = chain.latest_timestamp().await?;
    let expires_at = expiration(now, cfg.listing_ttl_secs);
    tracing::info!(
        expires_at,
        expires = %chrono::DateTime::from_timestamp(expires_at as i64, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
        "listing expiry"
    );

    let plan = plan_listings(inventory, quotes, marketplace, expires_at);
    let mut outcome = ListingOutcome {
        handles: Vec::new(),
        skipped: plan.skipped,
        expires_at,
    };
    if plan.txs.is_empty() {
        return Ok(outcome);
    }

    let mut nonces = NonceAllocator::fetch(chain).await?;
    tracing::info!(count = plan.txs.len(), base_nonce = nonces.base(), "submitting listings");

    outcome.handles = submit_batch(chain, &mut nonces, &plan.txs, cfg.gas_price_wei).await?;
    wait_all(chain, &outcome.handles, cfg.listing_confirmations, cfg.wait_timeout).await?;

    Ok(outcome)
}
