//! Startup orchestration.
//!
//! # Order
//! 1. Metrics exporter (optional)
//! 2. Registry client and domain cache
//! 3. HTTP server assembly
//! 4. Listener bind, last, so traffic only arrives once everything is ready
//!
//! Any failure before serving is fatal.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::blockchain::{BlockchainClient, BlockchainError, RegistryRpc};
use crate::config::ProxyConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::resolver::{MemoryPageCache, PageCache};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the proxy and serve until a termination signal arrives.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let rpc: Arc<dyn RegistryRpc> = Arc::new(BlockchainClient::new(config.blockchain.clone())?);
    let cache = Arc::new(MemoryPageCache::new(config.cache.max_entries));
    let shared_cache: Arc<dyn PageCache> = cache.clone();

    let bind_address = config.listener.bind_address.clone();
    let purge_interval = Duration::from_secs(config.cache.ttl_secs.max(1));
    let server = HttpServer::with_components(config, rpc, shared_cache)?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(purge_cache(cache, purge_interval, shutdown.subscribe()));

    shutdown.trigger_on_signal();

    server.run(listener, shutdown.subscribe()).await?;
    shutdown.trigger();
    Ok(())
}

/// Periodically drop expired mappings so idle domains do not pin memory.
async fn purge_cache(
    cache: Arc<MemoryPageCache>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "Purged expired domain mappings");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}
