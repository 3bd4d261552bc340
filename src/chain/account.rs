/// Sender identity handed to the pipeline
///
/// Account number and sequence arrive as strings (typically read from a
/// faucet accounts file) and must parse as non-negative integers before any
/// request leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Error)]
#[error("invalid {field} {value:?}: {source}")]
pub struct AccountParseError {
    pub field: &'static str,
    pub value: String,
    #[source]
    pub source: ParseIntError,
}

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AccountInfo {
    #[zeroize(skip)]
    pub local_account_name: String,

    pub password: String,

    #[zeroize(skip)]
    pub address: String,

    #[zeroize(skip)]
    pub account_number: String,

    #[zeroize(skip)]
    pub sequence: String,
}

/// Account number and sequence after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountNumbers {
    pub account_number: u64,
    pub sequence: u64,
}

impl AccountInfo {
    pub fn new(
        local_account_name: impl Into<String>,
        password: impl Into<String>,
        address: impl Into<String>,
        account_number: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Self {
        Self {
            local_account_name: local_account_name.into(),
            password: password.into(),
            address: address.into(),
            account_number: account_number.into(),
            sequence: sequence.into(),
        }
    }

    pub fn parse_account_number(&self) -> Result<u64, AccountParseError> {
        parse_field("account number", &self.account_number)
    }

    pub fn parse_sequence(&self) -> Result<u64, AccountParseError> {
        parse_field("sequence", &self.sequence)
    }

    pub fn numbers(&self) -> Result<AccountNumbers, AccountParseError> {
        Ok(AccountNumbers {
            account_number: self.parse_account_number()?,
            sequence: self.parse_sequence()?,
        })
    }
}

impl fmt::Debug for AccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountInfo")
            .field("local_account_name", &self.local_account_name)
            .field("password", &"<redacted>")
            .field("address", &self.address)
            .field("account_number", &self.account_number)
            .field("sequence", &self.sequence)
            .finish()
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<u64, AccountParseError> {
    value.trim().parse::<u64>().map_err(|source| AccountParseError {
        field,
        value: value.to_string(),
        source,
    })
}
