/// Submits signed transactions to the node's broadcast endpoint
use std::sync::Arc;

use crate::chain::codec::TxCodec;
use crate::chain::error::ClientError;
use crate::chain::transport::JsonTransport;
use crate::chain::tx::{BroadcastRequest, StdTx};

#[derive(Clone)]
pub struct Broadcaster {
    transport: Arc<dyn JsonTransport>,
    codec: TxCodec,
    broadcast_uri: String,
}

impl Broadcaster {
    pub fn new(
        transport: Arc<dyn JsonTransport>,
        codec: TxCodec,
        broadcast_uri: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            codec,
            broadcast_uri: broadcast_uri.into(),
        }
    }

    /// Broadcast `signed_tx` and return the node's receipt untouched.
    ///
    /// Submitting the same transaction twice is not guarded against here; the
    /// node decides what a duplicate means.
    pub async fn broadcast(&self, signed_tx: &StdTx) -> Result<Vec<u8>, ClientError> {
        let request = BroadcastRequest {
            tx: signed_tx.clone(),
        };
        let body = self.codec.encode(&request)?;

        let reply = self.transport.post_json(&self.broadcast_uri, body).await?;
        if !reply.is_ok() {
            return Err(ClientError::unexpected_status(reply.status, &reply.body));
        }
        Ok(reply.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::transport::{HttpReply, TransportError};
    use crate::chain::tx::{StdFee, StdSignature};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedTransport {
        reply: Result<HttpReply, String>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl FixedTransport {
        fn answering(status: u16, body: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(HttpReply {
                    status,
                    body: body.to_vec(),
                }),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(reason.to_string()),
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl JsonTransport for FixedTransport {
        async fn post_json(&self, uri: &str, body: Vec<u8>) -> Result<HttpReply, TransportError> {
            self.sent.lock().unwrap().push(body);
            self.reply.clone().map_err(|reason| TransportError::Request {
                uri: uri.to_string(),
                reason,
            })
        }
    }

    fn signed_tx() -> StdTx {
        StdTx {
            msg: vec![],
            fee: StdFee {
                amount: vec![],
                gas: 200000,
            },
            signatures: vec![StdSignature {
                pub_key: None,
                signature: "c2ln".to_string(),
                account_number: 5,
                sequence: 12,
            }],
            memo: String::new(),
        }
    }

    #[tokio::test]
    async fn test_broadcast_wraps_tx_and_returns_receipt() {
        let receipt = br#"{"check_tx":{},"deliver_tx":{},"hash":"ABCD","height":"10"}"#;
        let transport = FixedTransport::answering(200, receipt);
        let broadcaster = Broadcaster::new(transport.clone(), TxCodec::new(), "http://lcd/tx/broadcast");

        let result = broadcaster.broadcast(&signed_tx()).await.unwrap();
        assert_eq!(result, receipt.to_vec());

        let sent = transport.sent.lock().unwrap();
        let request: BroadcastRequest = TxCodec::new().decode(&sent[0]).unwrap();
        assert_eq!(request.tx, signed_tx());
    }

    #[tokio::test]
    async fn test_broadcast_non_ok_status() {
        let transport = FixedTransport::answering(400, b"invalid sequence");
        let broadcaster = Broadcaster::new(transport, TxCodec::new(), "http://lcd/tx/broadcast");

        match broadcaster.broadcast(&signed_tx()).await {
            Err(ClientError::UnexpectedStatus { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid sequence");
            }
            other => panic!("expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_transport_failure() {
        let transport = FixedTransport::failing("connection reset by peer");
        let broadcaster = Broadcaster::new(transport.clone(), TxCodec::new(), "http://lcd/tx/broadcast");

        let err = broadcaster.broadcast(&signed_tx()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
