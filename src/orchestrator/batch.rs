/// Batch signing for load-test data: build and sign one transfer per faucet
/// account, without broadcasting, and keep the ready-to-submit requests.
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{PipelineError, TransferPipeline};
use crate::chain::account::AccountInfo;
use crate::chain::tx::BroadcastRequest;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("signing task aborted: {0}")]
    Aborted(String),
}

/// Result of signing for one account
#[derive(Debug)]
pub struct SignedTxOutcome {
    pub account: String,
    pub result: Result<BroadcastRequest, BatchError>,
}

/// Sign a transfer to `receiver` from every account, at most `concurrency` at
/// a time. Every account gets exactly one outcome, in account order; one
/// account failing (or its task aborting) does not stop the others.
pub async fn generate_signed_txs(
    pipeline: Arc<TransferPipeline>,
    accounts: Vec<AccountInfo>,
    receiver: String,
    concurrency: usize,
) -> Vec<SignedTxOutcome> {
    let total = accounts.len();
    let names: Vec<String> = accounts
        .iter()
        .map(|account| account.local_account_name.clone())
        .collect();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let receiver: Arc<str> = receiver.into();
    let mut tasks = JoinSet::new();

    for (index, account) in accounts.into_iter().enumerate() {
        let pipeline = pipeline.clone();
        let semaphore = semaphore.clone();
        let receiver = receiver.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let name = account.local_account_name.clone();
            let signing =
                tokio::spawn(async move { pipeline.sign_transfer(&account, &receiver).await });

            let result = match signing.await {
                Ok(signed) => signed
                    .map(|tx| BroadcastRequest { tx })
                    .map_err(BatchError::from),
                Err(e) => {
                    log::error!("Signing task for {} aborted: {}", name, e);
                    Err(BatchError::Aborted(e.to_string()))
                }
            };
            (index, SignedTxOutcome { account: name, result })
        });
    }

    let mut slots: Vec<Option<SignedTxOutcome>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => log::error!("Batch task aborted: {}", e),
        }
    }

    let outcomes: Vec<SignedTxOutcome> = slots
        .into_iter()
        .zip(names)
        .map(|(slot, account)| {
            slot.unwrap_or_else(|| SignedTxOutcome {
                account,
                result: Err(BatchError::Aborted("task did not complete".to_string())),
            })
        })
        .collect();
    let signed = outcomes.iter().filter(|o| o.result.is_ok()).count();
    log::info!("Signed {}/{} transfers", signed, total);
    outcomes
}
