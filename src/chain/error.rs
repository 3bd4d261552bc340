use thiserror::Error;

use crate::chain::account::AccountParseError;
use crate::chain::codec::CodecError;
use crate::chain::transport::TransportError;

/// Failure of a single signing or broadcast round trip
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Account(#[from] AccountParseError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl ClientError {
    /// Status code of a non-success reply, if that is what failed
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    pub(crate) fn unexpected_status(status: u16, body: &[u8]) -> Self {
        const MAX_BODY: usize = 256;
        let mut body = String::from_utf8_lossy(body).into_owned();
        if body.len() > MAX_BODY {
            let mut cut = MAX_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        ClientError::UnexpectedStatus { status, body }
    }
}
