//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the page proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// On-chain domain registry settings.
    pub blockchain: BlockchainConfig,

    /// Domain mapping cache settings.
    pub cache: CacheConfig,

    /// Upstream page-hosting platform settings.
    pub upstream: UpstreamConfig,

    /// Per-page metadata overrides and branding.
    pub page: PageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum buffered request body forwarded upstream, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upstream fetch timeout in seconds.
    pub upstream_secs: u64,

    /// How long a streamed page may wait on a client that stopped reading.
    pub client_stall_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 20,
            client_stall_secs: 30,
        }
    }
}

/// Domain registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Address of the domain registry contract.
    pub contract_address: String,

    /// Timeout for a single RPC attempt in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://polygon-rpc.com/".to_string(),
            failover_urls: Vec::new(),
            contract_address: "0xD189E333277a8dbd65244A97bE3ecBE4f7Bee5cf".to_string(),
            rpc_timeout_secs: 5,
        }
    }
}

impl BlockchainConfig {
    /// Upper bound for a complete lookup, covering every configured provider.
    pub fn lookup_timeout_secs(&self) -> u64 {
        let providers = (self.failover_urls.len() as u64).saturating_add(1);
        self.rpc_timeout_secs.saturating_mul(providers)
    }
}

/// Domain mapping cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a positive lookup in seconds.
    pub ttl_secs: u64,

    /// Prefix prepended to the domain to build the cache key.
    pub key_prefix: String,

    /// Maximum number of cached mappings.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            key_prefix: "domain:".to_string(),
            max_entries: 10_000,
        }
    }
}

/// Upstream hosting platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL requests are forwarded to.
    pub base_url: String,

    /// Public hostname of the platform as it appears in served content.
    /// Replaced with the custom domain in scripts and restored in client XHRs.
    pub public_host: String,

    /// User agent presented on API calls.
    pub user_agent: String,

    /// API endpoint that is always queried without a request body.
    pub public_page_data_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.notion.so".to_string(),
            public_host: "www.notion.so".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/80.0.3987.163 Safari/537.36"
                .to_string(),
            public_page_data_path: "/api/v3/getPublicPageData".to_string(),
        }
    }
}

/// Metadata overrides applied to proxied pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    /// Title override; empty leaves the upstream title untouched.
    pub title: String,

    /// Description override; empty leaves the upstream description untouched.
    pub description: String,

    /// Hidden footer text appended to every proxied page.
    pub branding: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            branding: "Powered by page-proxy".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format (text or json).
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
