/// Transfer pipeline - sequences build, sign and broadcast for one transfer
///
/// Stages run strictly in order and the first failure ends the run: nothing is
/// retried and nothing from a failed run is kept for later. Independent
/// transfers may share one pipeline; the only shared state is the sealed
/// prefix set and the codec, both read-only.

use std::sync::Arc;
use uuid::Uuid;

use crate::chain::account::AccountInfo;
use crate::chain::broadcaster::Broadcaster;
use crate::chain::codec::TxCodec;
use crate::chain::error::ClientError;
use crate::chain::signer_client::RemoteSigner;
use crate::chain::tx::StdTx;
use crate::chain::tx_builder::{BuildError, UnsignedTxBuilder};

mod batch;
mod error;

pub use self::batch::{generate_signed_txs, BatchError, SignedTxOutcome};
pub use self::error::{PipelineError, Stage};

pub struct TransferPipeline {
    builder: Arc<dyn UnsignedTxBuilder>,
    signer: RemoteSigner,
    broadcaster: Broadcaster,
    codec: TxCodec,
}

impl TransferPipeline {
    pub fn new(
        builder: Arc<dyn UnsignedTxBuilder>,
        signer: RemoteSigner,
        broadcaster: Broadcaster,
        codec: TxCodec,
    ) -> Self {
        Self {
            builder,
            signer,
            broadcaster,
            codec,
        }
    }

    /// Build, sign and broadcast a transfer from `sender` to `receiver`.
    ///
    /// Returns the broadcast response exactly as the node sent it.
    pub async fn transfer(
        &self,
        sender: &AccountInfo,
        receiver: &str,
    ) -> Result<Vec<u8>, PipelineError> {
        let transfer_id = Uuid::new_v4();
        let signed_tx = self.run_signing(transfer_id, sender, receiver).await?;

        let receipt = self
            .broadcaster
            .broadcast(&signed_tx)
            .await
            .map_err(|e| self.fail(transfer_id, PipelineError::Broadcast(e)))?;

        log::info!(
            "[{}] Broadcast transfer {} -> {} ({} bytes in receipt)",
            transfer_id,
            sender.local_account_name,
            receiver,
            receipt.len()
        );
        Ok(receipt)
    }

    /// Build and sign without broadcasting
    pub async fn sign_transfer(
        &self,
        sender: &AccountInfo,
        receiver: &str,
    ) -> Result<StdTx, PipelineError> {
        self.run_signing(Uuid::new_v4(), sender, receiver).await
    }

    async fn run_signing(
        &self,
        transfer_id: Uuid,
        sender: &AccountInfo,
        receiver: &str,
    ) -> Result<StdTx, PipelineError> {
        // Reject malformed sender numbers before anything leaves the process
        let numbers = sender
            .numbers()
            .map_err(|e| self.fail(transfer_id, PipelineError::Parse(e)))?;
        log::debug!(
            "[{}] Transfer for {} (account_number={}, sequence={})",
            transfer_id,
            sender.local_account_name,
            numbers.account_number,
            numbers.sequence
        );

        let unsigned_bytes = self
            .builder
            .build_transfer(sender, receiver, true)
            .await
            .map_err(|e| self.fail(transfer_id, PipelineError::Build(e)))?;

        let unsigned_tx = self
            .codec
            .decode_tx(&unsigned_bytes)
            .map_err(|e| self.fail(transfer_id, PipelineError::Build(BuildError::Codec(e))))?;

        let signed_bytes = self
            .signer
            .sign(&unsigned_tx, sender)
            .await
            .map_err(|e| self.fail(transfer_id, PipelineError::Sign(e)))?;

        let signed_tx = self
            .codec
            .decode_tx(&signed_bytes)
            .map_err(|e| self.fail(transfer_id, PipelineError::Sign(ClientError::Codec(e))))?;

        log::debug!(
            "[{}] Signed tx carries {} signature(s)",
            transfer_id,
            signed_tx.signatures.len()
        );
        Ok(signed_tx)
    }

    fn fail(&self, transfer_id: Uuid, error: PipelineError) -> PipelineError {
        log::error!("[{}] {} stage failed: {}", transfer_id, error.stage(), error);
        error
    }
}
