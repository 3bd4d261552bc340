use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faucet_tx::chain::{
    init_bech32, BankTransferBuilder, Broadcaster, JsonTransport, RemoteSigner, ReqwestTransport,
    TxCodec,
};
use faucet_tx::config::{load_accounts, Config};
use faucet_tx::orchestrator::{generate_signed_txs, TransferPipeline};
use faucet_tx::AccountInfo;

// Constants for validation
const MAX_CONCURRENCY: usize = 256;

#[derive(Parser)]
#[command(name = "faucet_tx")]
#[command(about = "Faucet transfer tool: build, remotely sign and broadcast test transactions", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Send one faucet transfer and print the node's receipt
    Transfer {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Local key name known to the signing service
        #[arg(long)]
        name: String,

        /// Key password for the signing service
        #[arg(long, env = "FAUCET_PASSWORD", hide_env_values = true)]
        password: String,

        /// Sender address
        #[arg(long)]
        address: String,

        /// Sender account number
        #[arg(long)]
        account_number: String,

        /// Sender sequence
        #[arg(long)]
        sequence: String,

        /// Receiver address
        #[arg(short, long)]
        receiver: String,
    },

    /// Sign one transfer per faucet account and write the broadcast bodies to a file
    GenSignedTx {
        /// Configuration file path
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// JSON file with faucet accounts
        #[arg(short, long, default_value = "accounts.json")]
        accounts: String,

        /// Receiver address
        #[arg(short, long)]
        receiver: String,

        /// Output path for signed transactions
        #[arg(short, long, default_value = "signed_txs.json")]
        output: String,

        /// Number of accounts signed concurrently
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faucet_tx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            info!("Configuration file created at: {}", output);
        }
        Commands::Transfer {
            config,
            name,
            password,
            address,
            account_number,
            sequence,
            receiver,
        } => {
            let sender = AccountInfo::new(name, password, address, account_number, sequence);
            run_transfer(&config, sender, &receiver).await?;
        }
        Commands::GenSignedTx {
            config,
            accounts,
            receiver,
            output,
            concurrency,
        } => {
            run_gen_signed_tx(&config, &accounts, receiver, &output, concurrency).await?;
        }
    }

    Ok(())
}

/// Seal the address prefixes and wire the pipeline from configuration
fn build_pipeline(config: &Config) -> Result<TransferPipeline> {
    let addresses = init_bech32(config.bech32.clone())?;
    let codec = TxCodec::new();

    let api_key = std::env::var("FAUCET_API_KEY")
        .ok()
        .or_else(|| config.node.api_key.clone());
    let transport: Arc<dyn JsonTransport> =
        Arc::new(ReqwestTransport::new(config.node.timeout(), api_key)?);

    let builder = Arc::new(BankTransferBuilder::from_config(
        addresses,
        codec,
        &config.transfer,
    )?);
    let signer = RemoteSigner::new(
        transport.clone(),
        codec,
        config.node.sign_uri(),
        config.node.chain_id.clone(),
    );
    let broadcaster = Broadcaster::new(transport, codec, config.node.broadcast_uri());

    info!("Signing endpoint: {}", config.node.sign_uri());
    info!("Broadcast endpoint: {}", config.node.broadcast_uri());
    Ok(TransferPipeline::new(builder, signer, broadcaster, codec))
}

async fn run_transfer(config_path: &str, sender: AccountInfo, receiver: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let pipeline = build_pipeline(&config)?;

    info!("Transferring {} from {} to {}", config.transfer.amount, sender.address, receiver);
    let receipt = pipeline.transfer(&sender, receiver).await?;

    // The receipt is opaque; pretty-print it when it happens to be JSON
    match serde_json::from_slice::<serde_json::Value>(&receipt) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&receipt)),
    }
    Ok(())
}

async fn run_gen_signed_tx(
    config_path: &str,
    accounts_path: &str,
    receiver: String,
    output: &str,
    concurrency: usize,
) -> Result<()> {
    if concurrency == 0 || concurrency > MAX_CONCURRENCY {
        bail!("Concurrency must be between 1 and {}", MAX_CONCURRENCY);
    }

    let config = Config::load(config_path)?;
    let accounts = load_accounts(accounts_path)?;
    let pipeline = Arc::new(build_pipeline(&config)?);

    info!("Signing transfers for {} accounts", accounts.len());
    let outcomes = generate_signed_txs(pipeline, accounts, receiver, concurrency).await;

    let mut signed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(request) => signed.push(request),
            Err(e) => warn!("Skipping {}: {}", outcome.account, e),
        }
    }

    if signed.is_empty() {
        error!("No transaction could be signed");
        bail!("all signing attempts failed");
    }

    std::fs::write(output, serde_json::to_vec_pretty(&signed)?)?;
    info!("Wrote {} signed transactions to {}", signed.len(), output);
    Ok(())
}
