use std::ops::Range;

use crate::chain::Chain;
use crate::error::ChainError;

/// Hands out contiguous nonces for one batch.
///
/// Obtained once per batch from the node's pending count, then advanced
/// locally. Held by `&mut` for the batch so two batches never share one.
#[derive(Debug)]
pub struct NonceAllocator {
    base: u64,
    next: u64,
}

impl NonceAllocator {
    pub fn new(base: u64) -> Self {
        Self { base, next: base }
    }

    /// Fresh baseline from the node.
    pub async fn fetch<C: Chain + ?Sized>(chain: &C) -> Result<Self, ChainError> {
        let base = chain.next_nonce().await?;
        Ok(Self::new(base))
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Next nonce, never repeated.
    pub fn allocate(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        nonce
    }

    /// Every nonce handed out so far.
    pub fn issued(&self) -> Range<u64> {
        self.base..self.next
    }
}
