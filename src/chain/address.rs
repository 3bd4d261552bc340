/// Bech32 address prefixes and the sealed address codec built on them
///
/// The six prefixes are fixed once at startup through [`Bech32Config::configure`].
/// Everything that formats or parses an address afterwards borrows the sealed
/// [`Bech32Prefixes`] through an [`AddressCodec`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::chain::tx::PubKey;

/// Bech32 prefix of an account's address
pub const BECH32_PREFIX_ACC_ADDR: &str = "faa";
/// Bech32 prefix of an account's public key
pub const BECH32_PREFIX_ACC_PUB: &str = "fap";
/// Bech32 prefix of a validator's operator address
pub const BECH32_PREFIX_VAL_ADDR: &str = "fva";
/// Bech32 prefix of a validator's operator public key
pub const BECH32_PREFIX_VAL_PUB: &str = "fvp";
/// Bech32 prefix of a consensus node address
pub const BECH32_PREFIX_CONS_ADDR: &str = "fca";
/// Bech32 prefix of a consensus node public key
pub const BECH32_PREFIX_CONS_PUB: &str = "fcp";

// Amino registration prefixes (4 byte disambiguation + length byte)
const AMINO_PREFIX_SECP256K1: [u8; 5] = [0xeb, 0x5a, 0xe9, 0x87, 0x21];
const AMINO_PREFIX_ED25519: [u8; 5] = [0x16, 0x24, 0xde, 0x64, 0x20];

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("bech32 prefix for {0} must not be empty")]
    EmptyPrefix(&'static str),

    #[error("invalid bech32 prefix {prefix:?}: {reason}")]
    InvalidPrefix { prefix: String, reason: String },

    #[error("failed to encode bech32 data: {0}")]
    Encode(String),

    #[error("failed to decode address {address:?}: {reason}")]
    Decode { address: String, reason: String },

    #[error("address {address:?} has prefix {found:?}, expected {expected:?}")]
    WrongPrefix {
        address: String,
        expected: String,
        found: String,
    },

    #[error("invalid public key: {0}")]
    PubKey(String),
}

/// The six human-readable prefixes used by the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bech32Prefixes {
    pub account_addr: String,
    pub account_pub: String,
    pub validator_addr: String,
    pub validator_pub: String,
    pub consensus_addr: String,
    pub consensus_pub: String,
}

impl Default for Bech32Prefixes {
    fn default() -> Self {
        Self {
            account_addr: BECH32_PREFIX_ACC_ADDR.to_string(),
            account_pub: BECH32_PREFIX_ACC_PUB.to_string(),
            validator_addr: BECH32_PREFIX_VAL_ADDR.to_string(),
            validator_pub: BECH32_PREFIX_VAL_PUB.to_string(),
            consensus_addr: BECH32_PREFIX_CONS_ADDR.to_string(),
            consensus_pub: BECH32_PREFIX_CONS_PUB.to_string(),
        }
    }
}

impl Bech32Prefixes {
    /// Only non-emptiness is checked here; a malformed prefix fails on first use
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("account address", &self.account_addr),
            ("account public key", &self.account_pub),
            ("validator address", &self.validator_addr),
            ("validator public key", &self.validator_pub),
            ("consensus address", &self.consensus_addr),
            ("consensus public key", &self.consensus_pub),
        ];

        for (name, prefix) in fields {
            if prefix.trim().is_empty() {
                return Err(AddressError::EmptyPrefix(name));
            }
        }
        Ok(())
    }
}

/// Single-assignment holder for the network's bech32 prefixes
pub struct Bech32Config {
    prefixes: OnceLock<Bech32Prefixes>,
}

impl Bech32Config {
    pub const fn new() -> Self {
        Self {
            prefixes: OnceLock::new(),
        }
    }

    /// Set the prefixes and seal the configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration has already been sealed.
    pub fn configure(&self, prefixes: Bech32Prefixes) -> Result<&Bech32Prefixes, AddressError> {
        prefixes.validate()?;

        let mut fresh = false;
        let sealed = self.prefixes.get_or_init(|| {
            fresh = true;
            prefixes
        });
        if !fresh {
            panic!("bech32 prefix configuration is sealed and cannot be set twice");
        }

        log::info!(
            "Sealed bech32 prefixes: acc={}/{} val={}/{} cons={}/{}",
            sealed.account_addr,
            sealed.account_pub,
            sealed.validator_addr,
            sealed.validator_pub,
            sealed.consensus_addr,
            sealed.consensus_pub,
        );
        Ok(sealed)
    }

    pub fn get(&self) -> Option<&Bech32Prefixes> {
        self.prefixes.get()
    }

    pub fn is_sealed(&self) -> bool {
        self.prefixes.get().is_some()
    }
}

impl Default for Bech32Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide prefix configuration
pub static BECH32_CONFIG: Bech32Config = Bech32Config::new();

/// Seal the process-wide prefixes. Must be called once at startup.
pub fn init_bech32(prefixes: Bech32Prefixes) -> Result<AddressCodec, AddressError> {
    let sealed = BECH32_CONFIG.configure(prefixes)?;
    Ok(AddressCodec::new(sealed))
}

/// Encodes and decodes addresses and public keys under a sealed prefix set
#[derive(Debug, Clone, Copy)]
pub struct AddressCodec {
    prefixes: &'static Bech32Prefixes,
}

impl AddressCodec {
    pub fn new(prefixes: &'static Bech32Prefixes) -> Self {
        Self { prefixes }
    }

    pub fn acc_address(&self, addr: &[u8]) -> Result<String, AddressError> {
        encode(&self.prefixes.account_addr, addr)
    }

    pub fn val_address(&self, addr: &[u8]) -> Result<String, AddressError> {
        encode(&self.prefixes.validator_addr, addr)
    }

    pub fn cons_address(&self, addr: &[u8]) -> Result<String, AddressError> {
        encode(&self.prefixes.consensus_addr, addr)
    }

    pub fn acc_pub(&self, pub_key: &PubKey) -> Result<String, AddressError> {
        encode(&self.prefixes.account_pub, &amino_pub_key_bytes(pub_key)?)
    }

    pub fn val_pub(&self, pub_key: &PubKey) -> Result<String, AddressError> {
        encode(&self.prefixes.validator_pub, &amino_pub_key_bytes(pub_key)?)
    }

    pub fn cons_pub(&self, pub_key: &PubKey) -> Result<String, AddressError> {
        encode(&self.prefixes.consensus_pub, &amino_pub_key_bytes(pub_key)?)
    }

    /// Decode an account address, rejecting any other prefix
    pub fn parse_acc_address(&self, address: &str) -> Result<Vec<u8>, AddressError> {
        decode_with_prefix(&self.prefixes.account_addr, address)
    }
}

fn encode(prefix: &str, data: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(prefix).map_err(|e| AddressError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: e.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AddressError::Encode(e.to_string()))
}

fn decode_with_prefix(expected: &str, address: &str) -> Result<Vec<u8>, AddressError> {
    let (hrp, data) = bech32::decode(address).map_err(|e| AddressError::Decode {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    let found = hrp.to_string();
    if !found.eq_ignore_ascii_case(expected) {
        return Err(AddressError::WrongPrefix {
            address: address.to_string(),
            expected: expected.to_string(),
            found,
        });
    }
    if data.is_empty() {
        return Err(AddressError::Decode {
            address: address.to_string(),
            reason: "empty address payload".to_string(),
        });
    }
    Ok(data)
}

fn amino_pub_key_bytes(pub_key: &PubKey) -> Result<Vec<u8>, AddressError> {
    let (prefix, expected_len, encoded) = match pub_key {
        PubKey::Secp256k1(value) => (AMINO_PREFIX_SECP256K1, 33, value),
        PubKey::Ed25519(value) => (AMINO_PREFIX_ED25519, 32, value),
    };

    let raw = BASE64
        .decode(encoded)
        .map_err(|e| AddressError::PubKey(e.to_string()))?;
    if raw.len() != expected_len {
        return Err(AddressError::PubKey(format!(
            "expected {} key bytes, got {}",
            expected_len,
            raw.len()
        )));
    }

    let mut bytes = Vec::with_capacity(prefix.len() + raw.len());
    bytes.extend_from_slice(&prefix);
    bytes.extend_from_slice(&raw);
    Ok(bytes)
}

/// Leaked default prefixes for unit tests that must not touch the global seal
#[cfg(test)]
pub(crate) fn test_codec() -> AddressCodec {
    AddressCodec::new(Box::leak(Box::new(Bech32Prefixes::default())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_seals_prefixes() {
        let config = Bech32Config::new();
        assert!(!config.is_sealed());

        let sealed = config.configure(Bech32Prefixes::default()).unwrap();
        assert_eq!(sealed.account_addr, "faa");
        assert_eq!(sealed.consensus_pub, "fcp");
        assert!(config.is_sealed());
        assert_eq!(config.get(), Some(&Bech32Prefixes::default()));
    }

    #[test]
    #[should_panic(expected = "sealed")]
    fn test_configure_twice_panics() {
        let config = Bech32Config::new();
        config.configure(Bech32Prefixes::default()).unwrap();
        let _ = config.configure(Bech32Prefixes::default());
    }

    #[test]
    fn test_empty_prefix_rejected_without_sealing() {
        let config = Bech32Config::new();
        let prefixes = Bech32Prefixes {
            validator_pub: " ".to_string(),
            ..Bech32Prefixes::default()
        };

        let err = config.configure(prefixes).unwrap_err();
        assert!(matches!(err, AddressError::EmptyPrefix("validator public key")));
        assert!(!config.is_sealed());

        // A failed attempt leaves the slot open
        assert!(config.configure(Bech32Prefixes::default()).is_ok());
    }

    #[test]
    fn test_account_address_round_trip() {
        let codec = test_codec();
        let raw = [7u8; 20];

        let address = codec.acc_address(&raw).unwrap();
        assert!(address.starts_with("faa1"));
        assert_eq!(codec.parse_acc_address(&address).unwrap(), raw.to_vec());
    }

    #[test]
    fn test_parse_rejects_other_prefixes() {
        let codec = test_codec();
        let validator = codec.val_address(&[1u8; 20]).unwrap();
        assert!(validator.starts_with("fva1"));

        match codec.parse_acc_address(&validator) {
            Err(AddressError::WrongPrefix { expected, found, .. }) => {
                assert_eq!(expected, "faa");
                assert_eq!(found, "fva");
            }
            other => panic!("expected WrongPrefix, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let codec = test_codec();
        assert!(matches!(
            codec.parse_acc_address("faa1...xyz"),
            Err(AddressError::Decode { .. })
        ));
    }

    #[test]
    fn test_consensus_address_prefix() {
        let codec = test_codec();
        assert!(codec.cons_address(&[2u8; 20]).unwrap().starts_with("fca1"));
    }

    #[test]
    fn test_pub_key_encoding() {
        let codec = test_codec();
        let mut key = vec![0x02u8];
        key.extend_from_slice(&[0x11u8; 32]);
        let pub_key = PubKey::Secp256k1(BASE64.encode(&key));

        assert!(codec.acc_pub(&pub_key).unwrap().starts_with("fap1"));
        assert!(codec.val_pub(&pub_key).unwrap().starts_with("fvp1"));

        let ed = PubKey::Ed25519(BASE64.encode([0x22u8; 32]));
        assert!(codec.cons_pub(&ed).unwrap().starts_with("fcp1"));
    }

    #[test]
    fn test_pub_key_wrong_length() {
        let codec = test_codec();
        let pub_key = PubKey::Secp256k1(BASE64.encode([0x02u8; 10]));
        assert!(matches!(codec.acc_pub(&pub_key), Err(AddressError::PubKey(_))));
    }

    #[test]
    fn test_malformed_prefix_surfaces_on_encode() {
        let prefixes = Bech32Prefixes {
            account_addr: "fa a".to_string(),
            ..Bech32Prefixes::default()
        };
        assert!(prefixes.validate().is_ok());

        let codec = AddressCodec::new(Box::leak(Box::new(prefixes)));
        assert!(matches!(
            codec.acc_address(&[0u8; 20]),
            Err(AddressError::InvalidPrefix { .. })
        ));
    }
}
