use std::time::Duration;

use alloy::primitives::{Address, B256};
use thiserror::Error;

/// Failures talking to the node: reads, submissions and decode of results.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("network error: {0}")]
    Network(String),
    #[error("call to {target} failed inside aggregate")]
    CallFailed { target: Address },
    #[error("aggregate result {index} belongs to {got}, expected {expected}")]
    ResultMismatch {
        index: usize,
        expected: Address,
        got: Address,
    },
    #[error("aggregate returned {got} results for {expected} calls")]
    ResultCount { expected: usize, got: usize },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("relay rejected transaction: {0}")]
    Rejected(String),
}

/// Why a submitted transaction did not reach its required depth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("tx {hash} not confirmed after {after:?}")]
    Timeout { hash: B256, after: Duration },
    #[error("tx {hash} reverted")]
    Reverted { hash: B256 },
    #[error("tx {hash} wait failed: {message}")]
    Network { hash: B256, message: String },
}

impl WaitError {
    pub fn hash(&self) -> B256 {
        match self {
            WaitError::Timeout { hash, .. }
            | WaitError::Reverted { hash }
            | WaitError::Network { hash, .. } => *hash,
        }
    }
}

/// Failures from the off-chain asset index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("index returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// Top-level run error. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config: {0}")]
    Config(String),
    #[error("index query failed: {0}")]
    Index(#[from] IndexError),
    #[error("chain query failed: {0}")]
    Chain(#[from] ChainError),
    #[error("submission with nonce {nonce} failed ({outstanding} earlier tx outstanding): {source}")]
    Submission {
        nonce: u64,
        outstanding: usize,
        #[source]
        source: ChainError,
    },
    #[error("{failed} of {total} tx failed to confirm, first: {first}")]
    Confirmation {
        first: WaitError,
        failed: usize,
        total: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
