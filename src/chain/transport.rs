/// JSON-over-HTTP transport used by the signer client and broadcaster
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Status code the signing and broadcast endpoints answer with on success
pub const STATUS_CODE_OK: u16 = 200;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("request to {uri} failed: {reason}")]
    Request { uri: String, reason: String },
}

/// Status and raw body of a completed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_CODE_OK
    }
}

/// POST a JSON body and hand back whatever the server answered.
///
/// Only failures to complete the exchange are errors; any status code is a
/// successful reply at this layer.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn post_json(&self, uri: &str, body: Vec<u8>) -> Result<HttpReply, TransportError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    api_key: Option<String>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, api_key: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn post_json(&self, uri: &str, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        let request_failed = |e: reqwest::Error| TransportError::Request {
            uri: uri.to_string(),
            reason: e.to_string(),
        };

        let mut req = self
            .client
            .post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(api_key) = &self.api_key {
            req = req.header("X-API-Key", api_key);
        }

        let response = req.send().await.map_err(request_failed)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(request_failed)?.to_vec();

        log::debug!("POST {} -> {} ({} bytes)", uri, status, body.len());
        Ok(HttpReply { status, body })
    }
}
