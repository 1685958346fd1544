use alloy::primitives::Address;
use alloy::sol_types::SolCall;

use crate::chain::batch::{submit_batch, wait_all};
use crate::chain::nonce::NonceAllocator;
use crate::chain::{Chain, IERC721};
use crate::config::SubmitConfig;
use crate::error::{ChainError, Error};
use crate::types::{distinct_contracts, AggregateCall, AggregateResult, OutgoingTx, TxHandle};

/// Contracts on which `operator` may not yet move the wallet's tokens.
///
/// One aggregated `isApprovedForAll` read covers every contract. Each result
/// must carry the target it was requested for, in request order; anything
/// else is a hard failure, as is any failed or undecodable sub-call.
pub async fn find_unapproved<C: Chain + ?Sized>(
    chain: &C,
    operator: Address,
    contracts: &[Address],
) -> Result<Vec<Address>, Error> {
    let targets = distinct_contracts(contracts.iter().copied());
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let calls = approval_calls(chain.owner(), operator, &targets);
    let results = chain.aggregate(&calls).await?;
    Ok(unapproved_from(&calls, &results)?)
}

/// One `isApprovedForAll(owner, operator)` read per contract.
pub fn approval_calls(owner: Address, operator: Address, contracts: &[Address]) -> Vec<AggregateCall> {
    contracts
        .iter()
        .map(|&target| AggregateCall {
            target,
            call_data: IERC721::isApprovedForAllCall { owner, operator }
                .abi_encode()
                .into(),
        })
        .collect()
}

/// Pair each result with its request and collect the targets answering `false`.
pub fn unapproved_from(calls: &[AggregateCall], results: &[AggregateResult]) -> Result<Vec<Address>, ChainError> {
    if results.len() != calls.len() {
        return Err(ChainError::ResultCount {
            expected: calls.len(),
            got: results.len(),
        });
    }

    let mut unapproved = Vec::new();
    for (index, (call, result)) in calls.iter().zip(results).enumerate() {
        if result.target != call.target {
            return Err(ChainError::ResultMismatch {
                index,
                expected: call.target,
                got: result.target,
            });
        }
        if !result.success {
            return Err(ChainError::CallFailed { target: call.target });
        }

        let approved = IERC721::isApprovedForAllCall::abi_decode_returns(&result.return_data)
            .map_err(|e| ChainError::Decode(format!("isApprovedForAll on {}: {}", call.target, e)))?;

        tracing::debug!(contract = %call.target, approved, "approval state");
        if !approved {
            unapproved.push(call.target);
        }
    }

    Ok(unapproved)
}

/// `setApprovalForAll(operator, true)` for each contract, in the given order.
pub fn approval_txs(operator: Address, contracts: &[Address]) -> Vec<OutgoingTx> {
    contracts
        .iter()
        .map(|&to| OutgoingTx {
            to,
            input: IERC721::setApprovalForAllCall {
                operator,
                approved: true,
            }
            .abi_encode()
            .into(),
            label: format!("{:#x}", to),
        })
        .collect()
}

/// Grant `operator` approval on every contract and wait for the configured depth.
pub async fn grant_approvals<C: Chain + ?Sized>(
    chain: &C,
    operator: Address,
    contracts: &[Address],
    cfg: &SubmitConfig,
) -> Result<Vec<TxHandle>, Error> {
    if contracts.is_empty() {
        return Ok(Vec::new());
    }

    let txs = approval_txs(operator, contracts);
    let mut nonces = NonceAllocator::fetch(chain).await?;
    tracing::info!(count = txs.len(), base_nonce = nonces.base(), "submitting approvals");

    let handles = submit_batch(chain, &mut nonces, &txs, cfg.gas_price_wei).await?;
    wait_all(chain, &handles, cfg.approval_confirmations, cfg.wait_timeout).await?;

    Ok(handles)
}
