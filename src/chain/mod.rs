pub mod account;
pub mod address;
pub mod broadcaster;
pub mod codec;
pub mod error;
pub mod signer_client;
pub mod transport;
pub mod tx;
pub mod tx_builder;

pub use account::{AccountInfo, AccountParseError};
pub use address::{init_bech32, AddressCodec, AddressError, Bech32Config, Bech32Prefixes};
pub use broadcaster::Broadcaster;
pub use codec::{CodecError, TxCodec};
pub use error::ClientError;
pub use signer_client::RemoteSigner;
pub use transport::{HttpReply, JsonTransport, ReqwestTransport, TransportError};
pub use tx::{BroadcastRequest, Coin, Msg, SignRequest, StdTx};
pub use tx_builder::{BankTransferBuilder, BuildError, UnsignedTxBuilder};
