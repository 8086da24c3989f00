//! Domain → page resolution.
//!
//! # Algorithm
//! 1. Cache hit → return the cached page id, no network.
//! 2. Miss → one `eth_call` through the registry port, bounded by
//!    `lookup_timeout`.
//! 3. Empty page field → unregistered, never cached.
//! 4. Non-empty → cached for `ttl`, returned.
//! 5. Any RPC, decode, timeout or cache failure → unregistered for this
//!    request.
//!
//! Concurrent misses for one domain share a single lookup: the first caller
//! starts it and everyone arriving before it settles awaits the same outcome,
//! unregistered and failed lookups included.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::abi::{decode_domain_lookup, encode_domain_lookup};
use crate::blockchain::client::RegistryRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::observability::metrics::{self, LookupOutcome};
use crate::resolver::cache::PageCache;

/// A resolved custom domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMapping {
    pub domain: String,
    pub page: String,
}

/// Resolver tuning.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub key_prefix: String,
    pub ttl: Duration,
    pub lookup_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            key_prefix: "domain:".to_string(),
            ttl: Duration::from_secs(600),
            lookup_timeout: Duration::from_secs(5),
        }
    }
}

/// One registry lookup, awaited by every caller that missed the cache
/// while it ran.
type Flight = Shared<BoxFuture<'static, Option<String>>>;

/// Resolves custom domains to upstream page ids.
pub struct DomainResolver {
    rpc: Arc<dyn RegistryRpc>,
    cache: Arc<dyn PageCache>,
    settings: ResolverSettings,
    inflight: DashMap<String, Flight>,
}

impl DomainResolver {
    pub fn new(
        rpc: Arc<dyn RegistryRpc>,
        cache: Arc<dyn PageCache>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            rpc,
            cache,
            settings,
            inflight: DashMap::new(),
        }
    }

    fn cache_key(&self, domain: &str) -> String {
        format!("{}{}", self.settings.key_prefix, domain)
    }

    /// Resolve `domain`, returning `None` when it is unregistered or the
    /// lookup failed.
    pub async fn resolve(&self, domain: &str) -> Option<DomainMapping> {
        let key = self.cache_key(domain);

        match self.cache.get(&key).await {
            Ok(Some(page)) => {
                metrics::record_lookup(LookupOutcome::Hit);
                return Some(DomainMapping {
                    domain: domain.to_string(),
                    page,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Cache read failed");
                metrics::record_lookup(LookupOutcome::Error);
                return None;
            }
        }

        let flight = self.join_flight(domain, key);
        let page = flight.clone().await;

        self.inflight
            .remove_if(domain, |_, current| current.ptr_eq(&flight));

        page.map(|page| DomainMapping {
            domain: domain.to_string(),
            page,
        })
    }

    /// The lookup currently running for `domain`, or a new one.
    fn join_flight(&self, domain: &str, key: String) -> Flight {
        match self.inflight.entry(domain.to_string()) {
            // A settled flight left behind by a cancelled caller is stale.
            Entry::Occupied(entry) if entry.get().peek().is_none() => entry.get().clone(),
            entry => {
                let lookup = Lookup {
                    rpc: self.rpc.clone(),
                    cache: self.cache.clone(),
                    settings: self.settings.clone(),
                    domain: domain.to_string(),
                    key,
                };
                let flight = lookup.run().boxed().shared();
                entry.insert(flight.clone());
                flight
            }
        }
    }
}

/// Owned state of a single registry lookup.
struct Lookup {
    rpc: Arc<dyn RegistryRpc>,
    cache: Arc<dyn PageCache>,
    settings: ResolverSettings,
    domain: String,
    key: String,
}

impl Lookup {
    async fn run(self) -> Option<String> {
        let domain = &self.domain;
        metrics::record_lookup(LookupOutcome::Miss);

        let page = match self.fetch_remote().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Registry lookup failed");
                metrics::record_lookup(LookupOutcome::Error);
                return None;
            }
        };

        if page.is_empty() {
            tracing::debug!(domain = %domain, "Domain not registered");
            metrics::record_lookup(LookupOutcome::Unregistered);
            return None;
        }

        if let Err(e) = self.cache.put(&self.key, page.clone(), self.settings.ttl).await {
            tracing::warn!(domain = %domain, error = %e, "Cache write failed");
        }

        tracing::info!(domain = %domain, page = %page, "Resolved domain from registry");
        Some(page)
    }

    async fn fetch_remote(&self) -> BlockchainResult<String> {
        let call = self.rpc.call_registry(encode_domain_lookup(&self.domain));
        let raw = tokio::time::timeout(self.settings.lookup_timeout, call)
            .await
            .map_err(|_| BlockchainError::Timeout(self.settings.lookup_timeout.as_secs()))??;
        Ok(decode_domain_lookup(&raw)?.page)
    }
}


/// Normalise a `Host` value: lower-case, no port, no trailing dot.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        // IPv6 literal, keep the brackets.
        host.split_once(']')
            .map(|(addr, _)| format!("{addr}]"))
            .unwrap_or_else(|| host.to_string())
    } else {
        host.split(':').next().unwrap_or(host).to_string()
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}
