/// Unsigned transfer transaction builder
///
/// The pipeline only depends on [`UnsignedTxBuilder`]; [`BankTransferBuilder`]
/// is the local implementation that assembles a bank send from configuration
/// without touching the network or any key material.

use async_trait::async_trait;
use thiserror::Error;

use crate::chain::account::AccountInfo;
use crate::chain::address::{AddressCodec, AddressError};
use crate::chain::codec::{CodecError, TxCodec};
use crate::chain::tx::{Coin, Input, InvalidCoin, Msg, MsgSend, Output, StdFee, StdTx};
use crate::config::TransferConfig;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    #[error(transparent)]
    Coin(#[from] InvalidCoin),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("transfer amount must not be empty")]
    EmptyAmount,

    #[error("builder only produces generate-only (unsigned) transactions")]
    NotGenerateOnly,

    #[error("{0}")]
    Collaborator(String),
}

/// Produces the encoded unsigned transfer the signer will append to
#[async_trait]
pub trait UnsignedTxBuilder: Send + Sync {
    async fn build_transfer(
        &self,
        sender: &AccountInfo,
        receiver: &str,
        generate_only: bool,
    ) -> Result<Vec<u8>, BuildError>;
}

/// Builds a single-input single-output bank send
#[derive(Debug, Clone)]
pub struct BankTransferBuilder {
    addresses: AddressCodec,
    codec: TxCodec,
    amount: Vec<Coin>,
    fee: StdFee,
    memo: String,
}

impl BankTransferBuilder {
    pub fn new(addresses: AddressCodec, codec: TxCodec, amount: Vec<Coin>, fee: StdFee) -> Self {
        Self {
            addresses,
            codec,
            amount,
            fee,
            memo: String::new(),
        }
    }

    pub fn from_config(
        addresses: AddressCodec,
        codec: TxCodec,
        config: &TransferConfig,
    ) -> Result<Self, BuildError> {
        let amount = Coin::parse_list(&config.amount)?;
        let fee = StdFee {
            amount: Coin::parse_list(&config.fee)?,
            gas: config.gas,
        };
        Ok(Self::new(addresses, codec, amount, fee).with_memo(config.memo.clone()))
    }

    /// Builder pattern method to set the memo
    pub fn with_memo(mut self, memo: String) -> Self {
        self.memo = memo;
        self
    }

    /// Assemble the transaction. Both addresses must carry the account prefix.
    pub fn build_tx(&self, sender_address: &str, receiver: &str) -> Result<StdTx, BuildError> {
        if self.amount.is_empty() {
            return Err(BuildError::EmptyAmount);
        }
        self.addresses.parse_acc_address(sender_address)?;
        self.addresses.parse_acc_address(receiver)?;

        let send = MsgSend {
            inputs: vec![Input {
                address: sender_address.to_string(),
                coins: self.amount.clone(),
            }],
            outputs: vec![Output {
                address: receiver.to_string(),
                coins: self.amount.clone(),
            }],
        };

        Ok(StdTx {
            msg: vec![Msg::Send(send)],
            fee: self.fee.clone(),
            signatures: Vec::new(),
            memo: self.memo.clone(),
        })
    }
}

#[async_trait]
impl UnsignedTxBuilder for BankTransferBuilder {
    async fn build_transfer(
        &self,
        sender: &AccountInfo,
        receiver: &str,
        generate_only: bool,
    ) -> Result<Vec<u8>, BuildError> {
        // Keys live in the remote signer, so there is no other mode to offer
        if !generate_only {
            return Err(BuildError::NotGenerateOnly);
        }

        let tx = self.build_tx(&sender.address, receiver)?;
        for msg in &tx.msg {
            log::debug!("Built {} message for {}", msg.type_name(), sender.local_account_name);
        }
        Ok(self.codec.encode_tx_envelope(&tx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::address::test_codec;

    fn builder() -> BankTransferBuilder {
        let config = TransferConfig {
            amount: "10000000000000000000iris-atto".to_string(),
            fee: "4000000000000000iris-atto".to_string(),
            gas: 200000,
            memo: "faucet".to_string(),
        };
        BankTransferBuilder::from_config(test_codec(), TxCodec::new(), &config).unwrap()
    }

    fn sender() -> AccountInfo {
        let address = test_codec().acc_address(&[1u8; 20]).unwrap();
        AccountInfo::new("alice", "pw", address, "5", "12")
    }

    #[tokio::test]
    async fn test_build_transfer_decodes_back() {
        let receiver = test_codec().acc_address(&[2u8; 20]).unwrap();
        let bytes = builder()
            .build_transfer(&sender(), &receiver, true)
            .await
            .unwrap();

        let tx = TxCodec::new().decode_tx(&bytes).unwrap();
        assert_eq!(tx.memo, "faucet");
        assert_eq!(tx.fee.gas, 200000);
        assert_eq!(tx.fee.amount[0].amount, "4000000000000000");
        assert!(tx.signatures.is_empty());

        match &tx.msg[0] {
            Msg::Send(send) => {
                assert_eq!(send.inputs[0].address, sender().address);
                assert_eq!(send.outputs[0].address, receiver);
                assert_eq!(send.outputs[0].coins[0].denom, "iris-atto");
            }
            other => panic!("expected send, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refuses_signing_mode() {
        let receiver = test_codec().acc_address(&[2u8; 20]).unwrap();
        let result = builder().build_transfer(&sender(), &receiver, false).await;
        assert!(matches!(result, Err(BuildError::NotGenerateOnly)));
    }

    #[test]
    fn test_receiver_must_use_account_prefix() {
        let validator = test_codec().val_address(&[2u8; 20]).unwrap();
        let result = builder().build_tx(&sender().address, &validator);
        assert!(matches!(
            result,
            Err(BuildError::Address(AddressError::WrongPrefix { .. }))
        ));
    }

    #[test]
    fn test_invalid_amount_config() {
        let config = TransferConfig {
            amount: "lots".to_string(),
            fee: String::new(),
            gas: 200000,
            memo: String::new(),
        };
        assert!(matches!(
            BankTransferBuilder::from_config(test_codec(), TxCodec::new(), &config),
            Err(BuildError::Coin(_))
        ));
    }

    #[test]
    fn test_empty_amount_rejected() {
        let b = BankTransferBuilder::new(
            test_codec(),
            TxCodec::new(),
            vec![],
            StdFee { amount: vec![], gas: 1 },
        );
        let receiver = test_codec().acc_address(&[2u8; 20]).unwrap();
        assert!(matches!(
            b.build_tx(&sender().address, &receiver),
            Err(BuildError::EmptyAmount)
        ));
    }
}
