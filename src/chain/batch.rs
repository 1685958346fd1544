use std::time::Duration;

use futures_util::future::join_all;

use crate::chain::nonce::NonceAllocator;
use crate::chain::Chain;
use crate::error::{Error, WaitError};
use crate::types::{OutgoingTx, TxHandle};

/// Submit `txs` one by one with consecutive nonces.
///
/// Each send is acknowledged by the relay before the next goes out. The first
/// rejection aborts the rest; handles already returned stay outstanding.
pub async fn submit_batch<C: Chain + ?Sized>(
    chain: &C,
    nonces: &mut NonceAllocator,
    txs: &[OutgoingTx],
    gas_price: u128,
) -> Result<Vec<TxHandle>, Error> {
    let mut handles = Vec::with_capacity(txs.len());

    for tx in txs {
        let nonce = nonces.allocate();
        match chain.send(tx, nonce, gas_price).await {
            Ok(hash) => {
                tracing::info!(nonce, tx = %hash, label = %tx.label, "submitted");
                handles.push(TxHandle {
                    hash,
                    nonce,
                    label: tx.label.clone(),
                });
            }
            Err(source) => {
                tracing::error!(nonce, label = %tx.label, error = %source, "submission rejected");
                return Err(Error::Submission {
                    nonce,
                    outstanding: handles.len(),
                    source,
                });
            }
        }
    }

    tracing::debug!(nonces = ?nonces.issued(), "batch submitted");
    Ok(handles)
}

/// Wait for every handle concurrently, each bounded by `timeout`.
///
/// All waits run to completion. The batch fails if any one failed, reporting
/// the first failure in submission order.
pub async fn wait_all<C: Chain + ?Sized>(
    chain: &C,
    handles: &[TxHandle],
    confirmations: u64,
    timeout: Duration,
) -> Result<(), Error> {
    if handles.is_empty() {
        return Ok(());
    }

    tracing::info!(
        count = handles.len(),
        confirmations,
        ?timeout,
        "waiting for confirmations"
    );

    let waits = handles.iter().map(|h| async move {
        let outcome = match tokio::time::timeout(timeout, chain.wait_for(h.hash, confirmations)).await {
            Ok(res) => res,
            Err(_) => Err(WaitError::Timeout {
                hash: h.hash,
                after: timeout,
            }),
        };
        (h, outcome)
    });

    let mut failures = Vec::new();
    for (handle, outcome) in join_all(waits).await {
        match outcome {
            Ok(()) => {
                tracing::info!(nonce = handle.nonce, label = %handle.label, "confirmed");
            }
            Err(e) => {
                tracing::error!(nonce = handle.nonce, tx = %e.hash(), label = %handle.label, error = %e, "confirmation failed");
                failures.push(e);
            }
        }
    }

    let failed = failures.len();
    match failures.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(Error::Confirmation {
            first,
            failed,
            total: handles.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::test_helpers::*;

    fn txs(n: usize) -> Vec<OutgoingTx> {
        (0..n)
            .map(|i| OutgoingTx {
                to: contract(i as u8 + 1),
                input: Default::default(),
                label: format!("tx-{}", i),
            })
            .collect()
    }

    /// Scenario: five transactions submitted with the node reporting nonce 12.
    /// Expected: nonces 12..=16 in order, no gaps or repeats.
    #[tokio::test]
    async fn test_nonces_contiguous_from_fresh_base() {
        let chain = FakeChain::new().with_nonce(12);
        let mut nonces = NonceAllocator::fetch(&chain).await.unwrap();
        let handles = submit_batch(&chain, &mut nonces, &txs(5), 1).await.unwrap();

        let used: Vec<u64> = handles.iter().map(|h| h.nonce).collect();
        assert_eq!(used, vec![12, 13, 14, 15, 16]);
        assert_eq!(chain.sent_nonces(), used);
        assert_eq!(nonces.issued(), 12..17);
    }

    /// Scenario: relay rejects the third submission.
    /// Expected: batch aborts, two earlier tx outstanding, nothing after the rejection sent.
    #[tokio::test]
    async fn test_rejection_aborts_rest() {
        let chain = FakeChain::new().with_nonce(0).reject_nonce(2);
        let mut nonces = NonceAllocator::new(0);
        let err = submit_batch(&chain, &mut nonces, &txs(4), 1).await.unwrap_err();

        match err {
            Error::Submission { nonce, outstanding, .. } => {
                assert_eq!(nonce, 2);
                assert_eq!(outstanding, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(chain.sent_nonces(), vec![0, 1]);
    }

    /// Scenario: one of three transactions never mines.
    /// Expected: the batch reports a timeout even though the other two confirmed.
    #[tokio::test]
    async fn test_one_stuck_fails_batch() {
        let chain = FakeChain::new().with_nonce(3).stuck_nonce(4);
        let mut nonces = NonceAllocator::fetch(&chain).await.unwrap();
        let handles = submit_batch(&chain, &mut nonces, &txs(3), 1).await.unwrap();

        let err = wait_all(&chain, &handles, 1, Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            Error::Confirmation { first, failed, total } => {
                assert_eq!(
                    first,
                    WaitError::Timeout {
                        hash: handles[1].hash,
                        after: Duration::from_millis(50),
                    }
                );
                assert_eq!(first.to_string(), format!("tx {} not confirmed after 50ms", handles[1].hash));
                assert_eq!(first.hash(), handles[1].hash);
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(chain.confirmed_count(), 2);
    }

    /// Scenario: a reverted tx and a stuck tx in the same batch.
    /// Expected: first failure in submission order is reported, both counted.
    #[tokio::test]
    async fn test_first_failure_in_submission_order() {
        let chain = FakeChain::new().with_nonce(0).revert_nonce(1).stuck_nonce(2);
        let mut nonces = NonceAllocator::new(0);
        let handles = submit_batch(&chain, &mut nonces, &txs(3), 1).await.unwrap();

        let err = wait_all(&chain, &handles, 1, Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            Error::Confirmation { first, failed, .. } => {
                assert_eq!(first, WaitError::Reverted { hash: handles[1].hash });
                assert_eq!(failed, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_confirmation_depth_forwarded() {
        let chain = FakeChain::new();
        let mut nonces = NonceAllocator::new(0);
        let handles = submit_batch(&chain, &mut nonces, &txs(2), 1).await.unwrap();
        wait_all(&chain, &handles, 20, Duration::from_secs(1)).await.unwrap();
        assert_eq!(chain.wait_depths(), vec![20, 20]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let chain = FakeChain::new();
        wait_all(&chain, &[], 1, Duration::from_millis(10)).await.unwrap();
        assert_eq!(chain.confirmed_count(), 0);
    }
}
