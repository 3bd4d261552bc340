/// JSON codec shared by the signer client, broadcaster and pipeline
///
/// Top-level transactions may arrive wrapped in the amino envelope
/// `{"type": "auth/StdTx", "value": {...}}` or bare. Messages inside are
/// checked against the registered discriminators before the typed decode so a
/// foreign message type is reported by name instead of as a generic serde error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::chain::tx::{Msg, StdTx};

/// Amino name of the standard transaction
pub const STD_TX_TYPE: &str = "auth/StdTx";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unregistered transaction type {0:?}")]
    UnregisteredTx(String),

    #[error("unregistered message type {0:?}")]
    UnregisteredMessage(String),

    #[error("message {0} has no type discriminator")]
    MissingDiscriminator(usize),
}

#[derive(Serialize)]
struct TxEnvelope<'a> {
    #[serde(rename = "type")]
    type_name: &'static str,
    value: &'a StdTx,
}

#[derive(Debug, Clone, Copy)]
pub struct TxCodec {
    registry: &'static [&'static str],
}

impl Default for TxCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TxCodec {
    pub const fn new() -> Self {
        Self {
            registry: Msg::REGISTERED,
        }
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.registry.contains(&type_name)
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode a transaction inside its amino envelope
    pub fn encode_tx_envelope(&self, tx: &StdTx) -> Result<Vec<u8>, CodecError> {
        self.encode(&TxEnvelope {
            type_name: STD_TX_TYPE,
            value: tx,
        })
    }

    /// Decode a transaction in either enveloped or bare form
    pub fn decode_tx(&self, bytes: &[u8]) -> Result<StdTx, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let body = self.unwrap_envelope(value)?;
        self.check_messages(&body)?;
        Ok(serde_json::from_value(body)?)
    }

    fn unwrap_envelope(&self, mut value: Value) -> Result<Value, CodecError> {
        let type_name = match value.get("type") {
            Some(Value::String(type_name)) => type_name.clone(),
            _ => return Ok(value),
        };

        if type_name != STD_TX_TYPE {
            return Err(CodecError::UnregisteredTx(type_name));
        }
        Ok(value
            .get_mut("value")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn check_messages(&self, body: &Value) -> Result<(), CodecError> {
        let Some(messages) = body.get("msg").and_then(Value::as_array) else {
            // Leave shape errors to the typed decode
            return Ok(());
        };

        for (index, message) in messages.iter().enumerate() {
            let type_name = message
                .get("type")
                .and_then(Value::as_str)
                .ok_or(CodecError::MissingDiscriminator(index))?;
            if !self.is_registered(type_name) {
                log::warn!("Rejecting transaction with unregistered message type: {}", type_name);
                return Err(CodecError::UnregisteredMessage(type_name.to_string()));
            }
        }
        Ok(())
    }
}
