//! Custom-domain page proxy
//!
//! Serves pages of a hosted page platform under custom domains. Each domain
//! is mapped to a page id by an on-chain registry.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ driver ──▶ resolver ──▶ registry (eth_call)
//!                                       │            │
//!                                       │            └──▶ domain cache (TTL)
//!                                       ▼
//!                                   classifier
//!                                       │
//!              ┌────────────┬───────────┼────────────┬──────────────┐
//!              ▼            ▼           ▼            ▼              ▼
//!         robots/sitemap  redirect   asset        api          page proxy
//!           (local)       (local)   (rebrand)   (forward)    (HTML rewrite)
//! ```

use clap::Parser;
use std::path::PathBuf;

use page_proxy::config::{load_config, ProxyConfig};
use page_proxy::lifecycle;
use page_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "page-proxy")]
#[command(about = "Serve hosted pages under custom domains", long_about = None)]
struct Cli {
    /// Path to a TOML config file; built-in defaults are used when absent
    #[arg(short, long, env = "PAGE_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(long, env = "PAGE_PROXY_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "page-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.blockchain.rpc_url,
        contract = %config.blockchain.contract_address,
        cache_ttl_secs = config.cache.ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
