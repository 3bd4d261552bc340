/// Standard transaction shapes exchanged with the signing service and the node
///
/// Integers follow the amino JSON convention and travel as decimal strings.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid coin {0:?}, expected <amount><denom> such as 10iris-atto")]
pub struct InvalidCoin(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    /// Parse a single coin string like "4000000000000000iris-atto"
    pub fn parse(coin: &str) -> Result<Self, InvalidCoin> {
        let coin = coin.trim();
        let split_pos = coin
            .chars()
            .position(|c| !c.is_ascii_digit())
            .ok_or_else(|| InvalidCoin(coin.to_string()))?;

        let (amount, denom) = coin.split_at(split_pos);
        if amount.is_empty() || !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(InvalidCoin(coin.to_string()));
        }
        if amount.parse::<u128>().is_err() {
            return Err(InvalidCoin(coin.to_string()));
        }

        Ok(Self {
            denom: denom.to_string(),
            amount: amount.to_string(),
        })
    }

    /// Parse a comma separated coin list. An empty string is no coins.
    pub fn parse_list(coins: &str) -> Result<Vec<Self>, InvalidCoin> {
        coins
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Self::parse)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub address: String,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub address: String,
    pub coins: Vec<Coin>,
}

/// Bank transfer from inputs to outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
}

/// Bank issuance by a banker account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgIssue {
    pub banker: String,
    pub outputs: Vec<Output>,
}

/// Transaction message, discriminated by its registered amino name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Msg {
    #[serde(rename = "cosmos-sdk/Send")]
    Send(MsgSend),
    #[serde(rename = "cosmos-sdk/Issue")]
    Issue(MsgIssue),
}

impl Msg {
    /// Every discriminator the codec knows how to rebuild
    pub const REGISTERED: &'static [&'static str] = &["cosmos-sdk/Send", "cosmos-sdk/Issue"];

    pub fn type_name(&self) -> &'static str {
        match self {
            Msg::Send(_) => "cosmos-sdk/Send",
            Msg::Issue(_) => "cosmos-sdk/Issue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    #[serde(with = "u64_string")]
    pub gas: u64,
}

/// Public key as carried in a signature, base64 key bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PubKey {
    #[serde(rename = "tendermint/PubKeySecp256k1")]
    Secp256k1(String),
    #[serde(rename = "tendermint/PubKeyEd25519")]
    Ed25519(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    #[serde(default)]
    pub pub_key: Option<PubKey>,
    pub signature: String,
    #[serde(with = "u64_string")]
    pub account_number: u64,
    #[serde(with = "u64_string")]
    pub sequence: u64,
}

/// Standard transaction; unsigned until the signer appends to `signatures`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdTx {
    pub msg: Vec<Msg>,
    pub fee: StdFee,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signatures: Vec<StdSignature>,
    #[serde(default)]
    pub memo: String,
}

/// Body posted to the signing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRequest {
    pub tx: StdTx,
    pub name: String,
    pub password: String,
    pub chain_id: String,
    #[serde(with = "u64_string")]
    pub account_number: u64,
    #[serde(with = "u64_string")]
    pub sequence: u64,
    pub append_sig: bool,
}

/// Body posted to the broadcast endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub tx: StdTx,
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

/// u64 written as a decimal string, read from either a string or a number
pub mod u64_string {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(value: &u64, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(value)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(d)? {
            Repr::Text(text) => text.parse().map_err(D::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}
