// Library exports for faucet_tx

pub mod chain;
pub mod config;
pub mod orchestrator;

// Re-export main types for convenience
pub use chain::{AccountInfo, AddressCodec, Bech32Prefixes, TxCodec};
pub use orchestrator::{PipelineError, Stage, TransferPipeline};
