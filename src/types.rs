use std::collections::BTreeMap;

use alloy::primitives::{Address, Bytes, B256, U256};

// ─── Assets ───

/// Which category payload an asset's metadata carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Wearable,
    Emote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub contract: Address,
    pub token_id: U256,
    /// Blockchain-scoped item id inside the collection, if the index knows one.
    pub item_id: Option<String>,
    pub label: Option<String>,
    pub category: Option<Category>,
}

impl Asset {
    /// Catalog key: `"{contract}-{item_id}"`, lowercase hex.
    pub fn catalog_id(&self) -> Option<String> {
        self.item_id
            .as_ref()
            .map(|item| format!("{:#x}-{}", self.contract, item))
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Owned assets keyed by asset id. Ordered so batch nonce assignment is stable.
pub type Inventory = BTreeMap<String, Asset>;

/// Resolved listing prices, only strictly positive entries.
pub type PriceQuotes = BTreeMap<String, U256>;

pub fn inventory_from(assets: Vec<Asset>) -> Inventory {
    assets.into_iter().map(|a| (a.id.clone(), a)).collect()
}

/// Distinct contract addresses in first-seen order.
pub fn distinct_contracts(contracts: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut out: Vec<Address> = Vec::new();
    for contract in contracts {
        if !out.contains(&contract) {
            out.push(contract);
        }
    }
    out
}

// ─── Price signals ───

/// Two raw price signals from the index. Zero means absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceSignals {
    /// Cheapest open sell order for the catalog item.
    pub order_price: U256,
    /// Catalog list price of the item.
    pub item_price: U256,
}

// ─── Transactions ───

/// A state-changing call ready to be signed with a nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingTx {
    pub to: Address,
    pub input: Bytes,
    /// Log label: the contract being approved or the asset being listed.
    pub label: String,
}

/// Receipt of a relay-acknowledged submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: B256,
    pub nonce: u64,
    pub label: String,
}

/// One read inside an aggregated call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateCall {
    pub target: Address,
    pub call_data: Bytes,
}

/// Result of one aggregated read, tagged with the target it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateResult {
    pub target: Address,
    pub success: bool,
    pub return_data: Bytes,
}

// ─── Run summary ───

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub assets: usize,
    pub contracts: usize,
    pub approvals_sent: usize,
    pub priced: usize,
    pub listings_sent: usize,
    pub skipped: Vec<String>,
}
