use clap::{Parser, Subcommand};
use std::path::PathBuf;

use page_proxy::blockchain::{decode_domain_lookup, encode_domain_lookup, BlockchainClient, RegistryRpc};
use page_proxy::config::{load_config, BlockchainConfig};
use page_proxy::resolver::normalize_host;

#[derive(Parser)]
#[command(name = "registry-cli")]
#[command(about = "Inspect the on-chain domain registry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the eth_call data for a domain lookup
    Calldata { domain: String },
    /// Look a domain up against the live registry
    Resolve {
        domain: String,

        /// Proxy config file to take registry settings from
        #[arg(short, long, env = "PAGE_PROXY_CONFIG")]
        config: Option<PathBuf>,

        /// JSON-RPC endpoint (overrides the config)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Registry contract address (overrides the config)
        #[arg(long)]
        contract: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calldata { domain } => {
            println!("{}", encode_domain_lookup(&normalize_host(&domain)));
        }
        Commands::Resolve {
            domain,
            config,
            rpc_url,
            contract,
        } => {
            let mut registry = match config {
                Some(path) => load_config(&path)?.blockchain,
                None => BlockchainConfig::default(),
            };
            if let Some(url) = rpc_url {
                registry.rpc_url = url;
            }
            if let Some(address) = contract {
                registry.contract_address = address;
            }

            let domain = normalize_host(&domain);
            let client = BlockchainClient::new(registry)?;
            let raw = client.call_registry(encode_domain_lookup(&domain)).await?;
            let record = decode_domain_lookup(&raw)?;

            if record.page.is_empty() {
                println!("{domain}: unregistered");
            } else {
                println!("{domain}: {} (owner {})", record.page, record.owner);
            }
        }
    }

    Ok(())
}
