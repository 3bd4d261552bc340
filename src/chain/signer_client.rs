/// Client for the remote signing service that holds the faucet keys
use std::sync::Arc;

use crate::chain::account::AccountInfo;
use crate::chain::codec::TxCodec;
use crate::chain::error::ClientError;
use crate::chain::transport::JsonTransport;
use crate::chain::tx::{SignRequest, StdTx};

#[derive(Clone)]
pub struct RemoteSigner {
    transport: Arc<dyn JsonTransport>,
    codec: TxCodec,
    sign_uri: String,
    chain_id: String,
}

impl RemoteSigner {
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        codec: TxCodec,
        sign_uri: impl Into<String>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            codec,
            sign_uri: sign_uri.into(),
            chain_id: chain_id.into(),
        }
    }

    /// Ask the signing service to append the sender's signature to `unsigned_tx`.
    ///
    /// Returns the raw response body for the caller to decode. One round trip,
    /// no retries.
    pub async fn sign(
        &self,
        unsigned_tx: &StdTx,
        sender: &AccountInfo,
    ) -> Result<Vec<u8>, ClientError> {
        let numbers = sender.numbers()?;

        let request = SignRequest {
            tx: unsigned_tx.clone(),
            name: sender.local_account_name.clone(),
            password: sender.password.clone(),
            chain_id: self.chain_id.clone(),
            account_number: numbers.account_number,
            sequence: numbers.sequence,
            append_sig: true,
        };
        let body = self.codec.encode(&request)?;

        log::debug!(
            "Requesting signature for {} (account_number={}, sequence={})",
            sender.local_account_name,
            numbers.account_number,
            numbers.sequence
        );
        let reply = self.transport.post_json(&self.sign_uri, body).await?;

        if !reply.is_ok() {
            return Err(ClientError::unexpected_status(reply.status, &reply.body));
        }
        Ok(reply.body)
    }
}
