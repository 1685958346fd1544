// In-memory chain shared by the engine tests.
// Only compiled under #[cfg(test)].

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;

use crate::chain::Chain;
use crate::error::{ChainError, WaitError};
use crate::types::{AggregateCall, AggregateResult, Asset, Category, OutgoingTx};

pub const OWNER: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
pub const MARKETPLACE: Address = address!("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

pub fn contract(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn make_asset(id: &str, contract_byte: u8, token_id: u64, item_id: Option<&str>) -> Asset {
    Asset {
        id: id.to_string(),
        contract: contract(contract_byte),
        token_id: U256::from(token_id),
        item_id: item_id.map(str::to_string),
        label: Some(format!("{} label", id)),
        category: Some(Category::Wearable),
    }
}

#[derive(Default)]
struct State {
    next_nonce: u64,
    timestamp: u64,
    approvals: HashMap<Address, bool>,
    reject: HashSet<u64>,
    stuck: HashSet<u64>,
    revert: HashSet<u64>,
    shuffle: bool,
    fail_aggregate: bool,
    aggregate_calls: Vec<Vec<AggregateCall>>,
    sent: Vec<(u64, OutgoingTx, u128)>,
    wait_depths: Vec<u64>,
    confirmed: usize,
}

/// Scriptable `Chain`. Hash of a sent tx is its nonce + 1, left padded.
pub struct FakeChain {
    state: Mutex<State>,
}

pub fn hash_for(nonce: u64) -> B256 {
    B256::left_padding_from(&(nonce + 1).to_be_bytes())
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                timestamp: 1_700_000_000,
                ..Default::default()
            }),
        }
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().next_nonce = nonce;
        self
    }

    pub fn with_timestamp(self, ts: u64) -> Self {
        self.state.lock().unwrap().timestamp = ts;
        self
    }

    pub fn with_approval(self, target: Address, approved: bool) -> Self {
        self.state.lock().unwrap().approvals.insert(target, approved);
        self
    }

    pub fn reject_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().reject.insert(nonce);
        self
    }

    pub fn stuck_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().stuck.insert(nonce);
        self
    }

    pub fn revert_nonce(self, nonce: u64) -> Self {
        self.state.lock().unwrap().revert.insert(nonce);
        self
    }

    /// Return aggregate results in reverse order.
    pub fn shuffled_results(self) -> Self {
        self.state.lock().unwrap().shuffle = true;
        self
    }

    pub fn failing_aggregate(self) -> Self {
        self.state.lock().unwrap().fail_aggregate = true;
        self
    }

    pub fn aggregate_calls(&self) -> Vec<Vec<AggregateCall>> {
        self.state.lock().unwrap().aggregate_calls.clone()
    }

    pub fn sent(&self) -> Vec<(u64, OutgoingTx)> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(n, tx, _)| (*n, tx.clone()))
            .collect()
    }

    pub fn sent_nonces(&self) -> Vec<u64> {
        self.sent().into_iter().map(|(n, _)| n).collect()
    }

    pub fn sent_gas_prices(&self) -> Vec<u128> {
        self.state.lock().unwrap().sent.iter().map(|(_, _, g)| *g).collect()
    }

    pub fn wait_depths(&self) -> Vec<u64> {
        self.state.lock().unwrap().wait_depths.clone()
    }

    pub fn confirmed_count(&self) -> usize {
        self.state.lock().unwrap().confirmed
    }
}

#[async_trait]
impl Chain for FakeChain {
    fn owner(&self) -> Address {
        OWNER
    }

    async fn aggregate(&self, calls: &[AggregateCall]) -> Result<Vec<AggregateResult>, ChainError> {
        let mut st = self.state.lock().unwrap();
        st.aggregate_calls.push(calls.to_vec());
        if st.fail_aggregate {
            return Err(ChainError::Network("connection reset".into()));
        }

        let mut results: Vec<AggregateResult> = calls
            .iter()
            .map(|c| {
                let approved = st.approvals.get(&c.target).copied().unwrap_or(false);
                AggregateResult {
                    target: c.target,
                    success: true,
                    return_data: Bytes::from(approved.abi_encode()),
                }
            })
            .collect();
        if st.shuffle {
            results.reverse();
        }
        Ok(results)
    }

    async fn next_nonce(&self) -> Result<u64, ChainError> {
        let st = self.state.lock().unwrap();
        Ok(st.next_nonce)
    }

    async fn latest_timestamp(&self) -> Result<u64, ChainError> {
        Ok(self.state.lock().unwrap().timestamp)
    }

    async fn send(&self, tx: &OutgoingTx, nonce: u64, gas_price: u128) -> Result<B256, ChainError> {
        let mut st = self.state.lock().unwrap();
        if st.reject.contains(&nonce) {
            return Err(ChainError::Rejected(format!("nonce {} rejected", nonce)));
        }
        st.sent.push((nonce, tx.clone(), gas_price));
        st.next_nonce = st.next_nonce.max(nonce + 1);
        Ok(hash_for(nonce))
    }

    async fn wait_for(&self, hash: B256, confirmations: u64) -> Result<(), WaitError> {
        let nonce = {
            let mut st = self.state.lock().unwrap();
            st.wait_depths.push(confirmations);
            let nonce = st
                .sent
                .iter()
                .map(|(n, _, _)| *n)
                .find(|n| hash_for(*n) == hash);
            match nonce {
                Some(n) if st.revert.contains(&n) => return Err(WaitError::Reverted { hash }),
                Some(n) if st.stuck.contains(&n) => n,
                Some(_) => {
                    st.confirmed += 1;
                    return Ok(());
                }
                None => {
                    return Err(WaitError::Network {
                        hash,
                        message: "unknown transaction".into(),
                    })
                }
            }
        };
        tracing::debug!(nonce, "fake tx never mines");
        std::future::pending::<()>().await;
        Ok(())
    }
}
