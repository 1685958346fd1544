use crate::chain::Chain;
use crate::config::Config;
use crate::engine::approvals::{approval_txs, find_unapproved, grant_approvals};
use crate::engine::listings::{create_listings, expiration, plan_listings};
use crate::engine::pricing::resolve_prices;
use crate::error::Error;
use crate::market::AssetIndex;
use crate::types::{distinct_contracts, inventory_from, RunSummary};

/// One full pass: inventory → approval check → approvals → prices → listings.
///
/// Stages run strictly in order and every stage re-reads what it needs.
/// In dry-run mode nothing is submitted; the would-be transactions are logged.
pub async fn run<C, I>(chain: &C, index: &I, config: &Config) -> Result<RunSummary, Error>
where
    C: Chain + ?Sized,
    I: AssetIndex + ?Sized,
{
    let owner = chain.owner();
    let mut summary = RunSummary::default();

    // 1. Inventory
    let inventory = inventory_from(index.owned_assets(owner).await?);
    summary.assets = inventory.len();
    tracing::info!(stage = "1/5 inventory", %owner, assets = inventory.len(), "done");
    if inventory.is_empty() {
        tracing::info!("wallet owns nothing, stopping");
        return Ok(summary);
    }

    // 2. Approval check
    let contracts = distinct_contracts(inventory.values().map(|a| a.contract));
    summary.contracts = contracts.len();
    let unapproved = find_unapproved(chain, config.marketplace, &contracts).await?;
    tracing::info!(
        stage = "2/5 approval check",
        contracts = contracts.len(),
        unapproved = unapproved.len(),
        "done"
    );

    // 3. Approvals
    if config.dry_run {
        for tx in approval_txs(config.marketplace, &unapproved) {
            tracing::info!(contract = %tx.to, "[dry run] would approve marketplace");
        }
    } else {
        let handles = grant_approvals(chain, config.marketplace, &unapproved, &config.submit).await?;
        summary.approvals_sent = handles.len();
    }
    tracing::info!(stage = "3/5 approvals", sent = summary.approvals_sent, "done");

    // 4. Prices
    let quotes = resolve_prices(index, inventory.values(), &config.pricing).await?;
    summary.priced = quotes.len();
    tracing::info!(stage = "4/5 pricing", priced = quotes.len(), "done");

    // 5. Listings
    if config.dry_run {
        let now = chain.latest_timestamp().await?;
        let plan = plan_listings(
            &inventory,
            &quotes,
            config.marketplace,
            expiration(now, config.submit.listing_ttl_secs),
        );
        for tx in &plan.txs {
            tracing::info!(asset = %tx.label, "[dry run] would list");
        }
        summary.skipped = plan.skipped;
    } else {
        let outcome = create_listings(chain, &inventory, &quotes, config.marketplace, &config.submit).await?;
        summary.listings_sent = outcome.handles.len();
        summary.skipped = outcome.skipped;
    }
    tracing::info!(
        stage = "5/5 listings",
        sent = summary.listings_sent,
        skipped = summary.skipped.len(),
        "done"
    );

    Ok(summary)
}
