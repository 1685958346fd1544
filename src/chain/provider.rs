use std::str::FromStr;

use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, TransactionRequest};
use alloy::signers::local::LocalSigner;
use alloy::signers::Signer as _;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::chain::{Chain, IMulticall3};
use crate::config::Config;
use crate::error::{ChainError, Error, WaitError};
use crate::types::{AggregateCall, AggregateResult, OutgoingTx};

/// `aggregate3` calldata with every sub-call required to succeed.
pub fn encode_aggregate(calls: &[AggregateCall]) -> Bytes {
    IMulticall3::aggregate3Call {
        calls: calls
            .iter()
            .map(|c| IMulticall3::Call3 {
                target: c.target,
                allowFailure: false,
                callData: c.call_data.clone(),
            })
            .collect(),
    }
    .abi_encode()
    .into()
}

/// Decode `aggregate3` return data and tag each entry with the target it answers.
pub fn decode_aggregate(calls: &[AggregateCall], raw: &[u8]) -> Result<Vec<AggregateResult>, ChainError> {
    let decoded = IMulticall3::aggregate3Call::abi_decode_returns(raw)
        .map_err(|e| ChainError::Decode(format!("aggregate3 returns: {}", e)))?;

    if decoded.len() != calls.len() {
        return Err(ChainError::ResultCount {
            expected: calls.len(),
            got: decoded.len(),
        });
    }

    // Multicall3 answers in call order.
    Ok(calls
        .iter()
        .zip(decoded)
        .map(|(c, r)| AggregateResult {
            target: c.target,
            success: r.success,
            return_data: r.returnData,
        })
        .collect())
}

/// `Chain` backed by an alloy provider with the wallet's local signer.
pub struct AlloyChain {
    provider: DynProvider,
    owner: Address,
    multicall: Address,
}

impl AlloyChain {
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let signer = LocalSigner::from_str(&config.private_key)
            .map_err(|e| Error::Config(format!("invalid PRIVATE_KEY: {}", e)))?
            .with_chain_id(Some(config.chain_id));
        let owner = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&config.rpc_url)
            .await
            .map_err(|e| ChainError::Network(format!("connect {}: {}", config.rpc_url, e)))?
            .erased();

        Ok(Self {
            provider,
            owner,
            multicall: config.multicall,
        })
    }
}

#[async_trait]
impl Chain for AlloyChain {
    fn owner(&self) -> Address {
        self.owner
    }

    async fn aggregate(&self, calls: &[AggregateCall]) -> Result<Vec<AggregateResult>, ChainError> {
        let request = TransactionRequest::default()
            .to(self.multicall)
            .input(encode_aggregate(calls).into());

        let raw = self
            .provider
            .call(request)
            .await
            .map_err(|e| ChainError::Network(format!("aggregate3: {}", e)))?;

        decode_aggregate(calls, &raw)
    }

    async fn next_nonce(&self) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(self.owner)
            .pending()
            .await
            .map_err(|e| ChainError::Network(format!("nonce: {}", e)))
    }

    async fn latest_timestamp(&self) -> Result<u64, ChainError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| ChainError::Network(format!("latest block: {}", e)))?
            .ok_or_else(|| ChainError::Network("latest block missing".into()))?;
        Ok(block.header.timestamp)
    }

    async fn send(&self, tx: &OutgoingTx, nonce: u64, gas_price: u128) -> Result<B256, ChainError> {
        let request = TransactionRequest::default()
            .from(self.owner)
            .to(tx.to)
            .input(tx.input.clone().into())
            .nonce(nonce)
            .gas_price(gas_price);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| ChainError::Rejected(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for(&self, hash: B256, confirmations: u64) -> Result<(), WaitError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_required_confirmations(confirmations.max(1))
            .get_receipt()
            .await
            .map_err(|e| WaitError::Network {
                hash,
                message: e.to_string(),
            })?;

        if receipt.status() {
            Ok(())
        } else {
            Err(WaitError::Reverted { hash })
        }
    }
}
