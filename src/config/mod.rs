use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::chain::account::AccountInfo;
use crate::chain::address::Bech32Prefixes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    #[serde(default)]
    pub bech32: Bech32Prefixes,
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// LCD (REST) base URL, e.g. "http://127.0.0.1:1317"
    pub lcd_endpoint: String,
    #[serde(default = "default_sign_path")]
    pub sign_path: String,
    #[serde(default = "default_broadcast_path")]
    pub broadcast_path: String,
    pub chain_id: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    // Note: prefer FAUCET_API_KEY over writing the key into the file
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Coins sent per transfer, e.g. "10000000000000000000iris-atto"
    pub amount: String,
    pub fee: String,
    pub gas: u64,
    #[serde(default)]
    pub memo: String,
}

fn default_sign_path() -> String {
    "/tx/sign".to_string()
}

fn default_broadcast_path() -> String {
    "/tx/broadcast".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: NodeConfig {
                lcd_endpoint: "http://127.0.0.1:1317".to_string(),
                sign_path: default_sign_path(),
                broadcast_path: default_broadcast_path(),
                chain_id: "fuxi-test".to_string(),
                request_timeout: default_request_timeout(),
                api_key: None,
            },
            bech32: Bech32Prefixes::default(),
            transfer: TransferConfig {
                amount: "10000000000000000000iris-atto".to_string(),
                fee: "4000000000000000iris-atto".to_string(),
                gas: 200000,
                memo: String::new(),
            },
        }
    }
}

impl NodeConfig {
    pub fn sign_uri(&self) -> String {
        join_uri(&self.lcd_endpoint, &self.sign_path)
    }

    pub fn broadcast_uri(&self) -> String {
        join_uri(&self.lcd_endpoint, &self.broadcast_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.node.lcd_endpoint.starts_with("http://")
            && !self.node.lcd_endpoint.starts_with("https://")
        {
            bail!("lcd_endpoint must be an http(s) URL, got {:?}", self.node.lcd_endpoint);
        }
        if self.node.chain_id.trim().is_empty() {
            bail!("chain_id must not be empty");
        }
        if self.node.request_timeout == 0 {
            bail!("request_timeout must be at least 1 second");
        }
        if self.transfer.gas == 0 {
            bail!("transfer gas must be positive");
        }
        self.bech32.validate()?;
        Ok(())
    }
}

/// Load faucet accounts from a JSON array of account objects
pub fn load_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<AccountInfo>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read accounts file {}", path.display()))?;
    let accounts: Vec<AccountInfo> = serde_json::from_str(&content)?;
    if accounts.is_empty() {
        bail!("accounts file {} contains no accounts", path.display());
    }
    Ok(accounts)
}

fn join_uri(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("faucet_tx_{}_{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bech32.account_addr, "faa");
    }

    #[test]
    fn test_uris_join_cleanly() {
        let mut node = Config::default().node;
        node.lcd_endpoint = "http://localhost:1317/".to_string();
        assert_eq!(node.sign_uri(), "http://localhost:1317/tx/sign");
        assert_eq!(node.broadcast_uri(), "http://localhost:1317/tx/broadcast");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("config.toml");
        let mut config = Config::default();
        config.node.chain_id = "rainbow-dev".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.node.chain_id, "rainbow-dev");
        assert_eq!(loaded.transfer.gas, 200000);
        assert_eq!(loaded.bech32, Bech32Prefixes::default());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let content = r#"
[node]
lcd_endpoint = "http://10.0.0.1:1317"
chain_id = "fuxi-test"

[transfer]
amount = "1iris"
fee = "1iris"
gas = 100
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.node.sign_path, "/tx/sign");
        assert_eq!(config.node.request_timeout, 30);
        assert_eq!(config.bech32.validator_pub, "fvp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.node.lcd_endpoint = "localhost:1317".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.bech32.account_addr = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.node.request_timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_accounts() {
        let path = temp_path("accounts.json");
        std::fs::write(
            &path,
            r#"[{"local_account_name":"faucet-0","password":"pw","address":"faa1x","account_number":"1","sequence":"0"}]"#,
        )
        .unwrap();

        let accounts = load_accounts(&path).unwrap();
        assert_eq!(accounts[0].local_account_name, "faucet-0");

        std::fs::write(&path, "[]").unwrap();
        assert!(load_accounts(&path).is_err());

        std::fs::remove_file(&path).ok();
    }
}
