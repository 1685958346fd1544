//! On-chain side of the run: the `Chain` seam, contract bindings,
//! nonce allocation and batch submit/wait.

pub mod batch;
pub mod nonce;
pub mod provider;
#[cfg(test)]
pub mod test_helpers;

use alloy::primitives::{Address, B256};
use alloy::sol;
use async_trait::async_trait;

use crate::error::{ChainError, WaitError};
use crate::types::{AggregateCall, AggregateResult, OutgoingTx};

sol! {
    interface IERC721 {
        function setApprovalForAll(address operator, bool approved) external;
        function isApprovedForAll(address owner, address operator) external view returns (bool);
    }

    interface IMarketplace {
        function createOrder(address nftAddress, uint256 assetId, uint256 priceInWei, uint256 expiresAt) external;
    }

    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Call3Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Call3Result[] memory returnData);
    }
}

/// Everything the engine needs from the node, for one wallet.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Wallet that signs every submission.
    fn owner(&self) -> Address;

    /// Execute all reads in one atomic aggregate call.
    /// Results come back in call order, each tagged with its target.
    async fn aggregate(&self, calls: &[AggregateCall]) -> Result<Vec<AggregateResult>, ChainError>;

    /// Wallet's next unused nonce, including pending transactions.
    async fn next_nonce(&self) -> Result<u64, ChainError>;

    /// Timestamp of the latest block, seconds.
    async fn latest_timestamp(&self) -> Result<u64, ChainError>;

    /// Sign and submit. Returns once the relay has accepted the transaction.
    async fn send(&self, tx: &OutgoingTx, nonce: u64, gas_price: u128) -> Result<B256, ChainError>;

    /// Resolve once `hash` is mined under `confirmations` blocks.
    /// Unbounded; callers apply their own timeout.
    async fn wait_for(&self, hash: B256, confirmations: u64) -> Result<(), WaitError>;
}
