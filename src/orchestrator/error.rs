use std::fmt;
use thiserror::Error;

use crate::chain::account::AccountParseError;
use crate::chain::error::ClientError;
use crate::chain::tx_builder::BuildError;

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Build,
    Sign,
    Broadcast,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Build => "build",
            Stage::Sign => "sign",
            Stage::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid sender info: {0}")]
    Parse(#[from] AccountParseError),

    #[error("build unsigned tx failed: {0}")]
    Build(#[source] BuildError),

    #[error("sign tx failed: {0}")]
    Sign(#[source] ClientError),

    #[error("broadcast tx failed: {0}")]
    Broadcast(#[source] ClientError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Parse(_) => Stage::Parse,
            PipelineError::Build(_) => Stage::Build,
            PipelineError::Sign(_) => Stage::Sign,
            PipelineError::Broadcast(_) => Stage::Broadcast,
        }
    }
}
