//! Registry RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Issue the read-only `eth_call` against the registry contract
//! - Bound every attempt with a timeout; fail over on error or timeout

use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult};
use crate::observability::metrics;

/// Read-only access to the domain registry contract.
#[async_trait]
pub trait RegistryRpc: Send + Sync {
    /// Execute an `eth_call` with the given call data and return the raw result.
    async fn call_registry(&self, data: Bytes) -> BlockchainResult<Bytes>;
}

/// Registry client backed by alloy HTTP providers.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Registry contract.
    contract: Address,
    /// Configuration.
    config: BlockchainConfig,
    /// Per-attempt timeout.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new registry client. No network traffic happens here.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let contract: Address = config
            .contract_address
            .parse()
            .map_err(|_| BlockchainError::InvalidAddress(config.contract_address.clone()))?;

        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            contract = %contract,
            "Registry client initialized"
        );

        Ok(Self {
            providers,
            contract,
            config,
            timeout_duration,
        })
    }

    /// Registry contract address.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Number of configured providers.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

#[async_trait]
impl RegistryRpc for BlockchainClient {
    async fn call_registry(&self, data: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default()
            .to(self.contract)
            .input(TransactionInput::new(data));

        let start = Instant::now();
        let mut timed_out = false;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.call(request.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => {
                    metrics::record_rpc_duration(start);
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    timed_out = true;
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        metrics::record_rpc_duration(start);

        if timed_out && self.providers.len() == 1 {
            return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs));
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("contract", &self.contract)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
