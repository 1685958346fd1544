use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{address, Address};

use crate::error::Error;

/// Multicall3, deployed at the same address on every EVM chain.
pub const MULTICALL3: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");

/// 365.25 days.
pub const DEFAULT_LISTING_TTL_SECS: u64 = 31_557_600;

/// Price derivation knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingConfig {
    /// Listing price = selected * numerator / denominator (truncated).
    pub discount_numerator: u64,
    pub discount_denominator: u64,
    /// Max outstanding index queries while resolving prices.
    /// Each asset keeps one query open, so this is also the asset fan-out.
    pub concurrency: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            discount_numerator: 1_000_000,
            discount_denominator: 1_100_000,
            concurrency: 5,
        }
    }
}

/// Transaction batch knobs shared by the approval and listing stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Fixed legacy gas price in wei.
    pub gas_price_wei: u128,
    pub approval_confirmations: u64,
    pub listing_confirmations: u64,
    pub listing_ttl_secs: u64,
    /// Upper bound on each confirmation wait.
    pub wait_timeout: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            gas_price_wei: 50_000_000_000,
            approval_confirmations: 20,
            listing_confirmations: 1,
            listing_ttl_secs: DEFAULT_LISTING_TTL_SECS,
            wait_timeout: Duration::from_secs(900),
        }
    }
}

/// Configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    // Node
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: String,

    // Contracts
    pub marketplace: Address,
    pub multicall: Address,

    // Index API
    pub index_api_url: String,
    pub index_page_size: usize,

    pub pricing: PricingConfig,
    pub submit: SubmitConfig,

    // Mode
    pub dry_run: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("marketplace", &self.marketplace)
            .field("multicall", &self.multicall)
            .field("index_api_url", &self.index_api_url)
            .field("index_page_size", &self.index_page_size)
            .field("pricing", &self.pricing)
            .field("submit", &self.submit)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes the process env.
    pub fn from_lookup<F>(get: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let private_key = get("PRIVATE_KEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("PRIVATE_KEY is required".into()))?;

        let marketplace = match get("MARKETPLACE_ADDRESS") {
            Some(s) => parse_address("MARKETPLACE_ADDRESS", &s)?,
            None => return Err(Error::Config("MARKETPLACE_ADDRESS is required".into())),
        };

        let multicall = match get("MULTICALL_ADDRESS") {
            Some(s) => parse_address("MULTICALL_ADDRESS", &s)?,
            None => MULTICALL3,
        };

        let pricing_defaults = PricingConfig::default();
        let pricing = PricingConfig {
            discount_numerator: parsed(&get, "DISCOUNT_NUMERATOR", pricing_defaults.discount_numerator)?,
            discount_denominator: parsed(&get, "DISCOUNT_DENOMINATOR", pricing_defaults.discount_denominator)?,
            concurrency: parsed(&get, "PRICE_CONCURRENCY", pricing_defaults.concurrency)?.max(1),
        };
        if pricing.discount_denominator == 0 {
            return Err(Error::Config("DISCOUNT_DENOMINATOR must be non-zero".into()));
        }

        let submit_defaults = SubmitConfig::default();
        let submit = SubmitConfig {
            gas_price_wei: parsed(&get, "GAS_PRICE_WEI", submit_defaults.gas_price_wei)?,
            approval_confirmations: parsed(&get, "APPROVAL_CONFIRMATIONS", submit_defaults.approval_confirmations)?,
            listing_confirmations: parsed(&get, "LISTING_CONFIRMATIONS", submit_defaults.listing_confirmations)?,
            listing_ttl_secs: parsed(&get, "LISTING_TTL_SECS", submit_defaults.listing_ttl_secs)?,
            wait_timeout: Duration::from_secs(parsed(
                &get,
                "CONFIRMATION_TIMEOUT_SECS",
                submit_defaults.wait_timeout.as_secs(),
            )?),
        };

        Ok(Self {
            rpc_url: get("RPC_URL")
                .unwrap_or_else(|| "https://polygon-bor-rpc.publicnode.com".into()),
            chain_id: parsed(&get, "CHAIN_ID", 137)?,
            private_key,
            marketplace,
            multicall,
            index_api_url: get("INDEX_API_URL")
                .unwrap_or_else(|| "https://nft-api.decentraland.org".into())
                .trim_end_matches('/')
                .to_string(),
            index_page_size: parsed(&get, "INDEX_PAGE_SIZE", 100usize)?.max(1),
            pricing,
            submit,
            dry_run: get("DRY_RUN")
                .map(|v| v == "1" || v.to_lowercase() == "true")
                .unwrap_or(false),
        })
    }
}

/// Value of `key`, or `default` when unset. A set but malformed value is an error.
fn parsed<F, T>(get: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|e| Error::Config(format!("{} ({}): {}", key, raw, e))),
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address, Error> {
    Address::from_str(value.trim())
        .map_err(|e| Error::Config(format!("{} is not an address ({}): {}", key, value, e)))
}
