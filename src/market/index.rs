use std::str::FromStr;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::IndexError;
use crate::market::AssetIndex;
use crate::types::{Asset, Category, PriceSignals};

/// HTTP client for the NFT index API (`/v1/nfts`, `/v1/orders`, `/v1/items`).
#[derive(Clone)]
pub struct IndexClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    total: Option<usize>,
}

#[derive(Deserialize)]
struct NftEntry {
    nft: NftRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NftRecord {
    id: String,
    contract_address: String,
    token_id: String,
    item_id: Option<String>,
    #[serde(default)]
    data: NftData,
}

#[derive(Deserialize, Default)]
struct NftData {
    wearable: Option<Named>,
    emote: Option<Named>,
}

#[derive(Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Deserialize)]
struct Priced {
    price: Option<String>,
}

impl NftRecord {
    fn into_asset(self) -> Result<Asset, IndexError> {
        let contract = Address::from_str(&self.contract_address).map_err(|e| {
            IndexError::Decode(format!("nft {} contract '{}': {}", self.id, self.contract_address, e))
        })?;
        let token_id = U256::from_str_radix(&self.token_id, 10).map_err(|e| {
            IndexError::Decode(format!("nft {} token id '{}': {}", self.id, self.token_id, e))
        })?;

        let (category, label) = match (self.data.wearable, self.data.emote) {
            (Some(w), _) => (Some(Category::Wearable), w.name),
            (None, Some(e)) => (Some(Category::Emote), e.name),
            (None, None) => (None, None),
        };

        Ok(Asset {
            id: self.id,
            contract,
            token_id,
            item_id: self.item_id.filter(|s| !s.is_empty()),
            label,
            category,
        })
    }
}

/// Decimal wei string to U256. Missing or empty means zero.
fn parse_price(raw: Option<&str>) -> Result<U256, IndexError> {
    match raw {
        None => Ok(U256::ZERO),
        Some(s) if s.trim().is_empty() => Ok(U256::ZERO),
        Some(s) => U256::from_str_radix(s.trim(), 10)
            .map_err(|e| IndexError::Decode(format!("price '{}': {}", s, e))),
    }
}

impl IndexClient {
    pub fn new(client: reqwest::Client, base_url: &str, page_size: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, IndexError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| IndexError::Decode(format!("{}: {}", path, e)))
    }

    /// First price in a `{data: [{price}]}` page, zero when the page is empty.
    async fn first_price(&self, path: &str, query: &[(&str, String)]) -> Result<U256, IndexError> {
        let page: Page<Priced> = self.get_json(path, query).await?;
        parse_price(page.data.first().and_then(|p| p.price.as_deref()))
    }
}

#[async_trait]
impl AssetIndex for IndexClient {
    async fn owned_assets(&self, owner: Address) -> Result<Vec<Asset>, IndexError> {
        let owner = format!("{:#x}", owner);
        let mut assets = Vec::new();
        let mut skip = 0usize;

        loop {
            let page: Page<NftEntry> = self
                .get_json(
                    "/v1/nfts",
                    &[
                        ("owner", owner.clone()),
                        ("first", self.page_size.to_string()),
                        ("skip", skip.to_string()),
                    ],
                )
                .await?;

            let count = page.data.len();
            for entry in page.data {
                assets.push(entry.nft.into_asset()?);
            }
            skip += count;

            tracing::debug!(page = count, total = ?page.total, fetched = skip, "inventory page");

            let reached_total = page.total.is_some_and(|t| skip >= t);
            if count < self.page_size || reached_total {
                break;
            }
        }

        Ok(assets)
    }

    /// Order floor first, then catalog price. One request in flight per asset.
    async fn price_signals(&self, asset: &Asset) -> Result<PriceSignals, IndexError> {
        let (Some(item_id), Some(catalog_id)) = (asset.item_id.as_ref(), asset.catalog_id()) else {
            return Ok(PriceSignals::default());
        };
        let contract = format!("{:#x}", asset.contract);

        let order_query = [
            ("contractAddress", contract.clone()),
            ("itemId", item_id.clone()),
            ("status", "open".to_string()),
            ("sortBy", "cheapest".to_string()),
            ("first", "1".to_string()),
        ];
        let item_query = [
            ("contractAddress", contract),
            ("itemId", item_id.clone()),
            ("first", "1".to_string()),
        ];

        let order_price = self.first_price("/v1/orders", &order_query).await?;
        let item_price = self.first_price("/v1/items", &item_query).await?;
        tracing::debug!(asset = %asset.id, item = %catalog_id, %order_price, %item_price, "signals");

        Ok(PriceSignals {
            order_price,
            item_price,
        })
    }
}
