//! List every NFT the wallet owns on the marketplace.
//!
//! Approves the marketplace on each collection that still needs it, prices
//! each asset from the index API (cheaper of open-order floor and catalog
//! price, less 10%), then submits one listing per priced asset.
//!
//! Usage:
//!   cargo run --release --bin lister
//!
//! Reads PRIVATE_KEY and MARKETPLACE_ADDRESS (plus optional overrides) from .env or environment.

use auto_lister::chain::provider::AlloyChain;
use auto_lister::chain::Chain;
use auto_lister::config::Config;
use auto_lister::engine::runner::run;
use auto_lister::error::Error;
use auto_lister::market::index::IndexClient;
use auto_lister::telemetry::init_logging;
use auto_lister::types::RunSummary;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    init_logging();

    match start().await {
        Ok(summary) => {
            eprintln!(
                "Done: {} assets, {} approvals, {} priced, {} listed, {} skipped",
                summary.assets,
                summary.approvals_sent,
                summary.priced,
                summary.listings_sent,
                summary.skipped.len(),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}

async fn start() -> Result<RunSummary, Error> {
    let config = Config::from_env()?;
    let chain = AlloyChain::connect(&config).await?;
    let index = IndexClient::new(reqwest::Client::new(), &config.index_api_url, config.index_page_size);

    eprintln!("╔══════════════════════════════════════════════════╗");
    eprintln!("║  Auto-lister | chain {} | dry run: {}", config.chain_id, config.dry_run);
    eprintln!("║  Wallet: {}", chain.owner());
    eprintln!("║  Marketplace: {}", config.marketplace);
    eprintln!(
        "║  Discount: {}/{} | gas price: {} wei",
        config.pricing.discount_numerator, config.pricing.discount_denominator, config.submit.gas_price_wei,
    );
    eprintln!(
        "║  Confirmations: approve={} list={} | timeout {}s",
        config.submit.approval_confirmations,
        config.submit.listing_confirmations,
        config.submit.wait_timeout.as_secs(),
    );
    eprintln!("╚══════════════════════════════════════════════════╝");

    run(&chain, &index, &config).await
}
