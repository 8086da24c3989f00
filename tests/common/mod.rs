//! Shared utilities for integration testing.

use alloy::primitives::Bytes as AbiBytes;
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use page_proxy::blockchain::{BlockchainResult, RegistryRpc};
use page_proxy::config::ProxyConfig;
use page_proxy::lifecycle::Shutdown;
use page_proxy::resolver::MemoryPageCache;
use page_proxy::HttpServer;

pub const PAGE: &str = "abcdef0123456789abcdef0123456789";
pub const DOMAIN: &str = "pages.example.com";

/// Request as seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

pub type Responder = Arc<dyn Fn(&Recorded) -> Response + Send + Sync>;

/// Mock upstream platform that records every request it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("upstream saw no requests")
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a mock upstream on an ephemeral port.
pub async fn start_upstream(responder: Responder) -> MockUpstream {
    start_slow_upstream(responder, Duration::ZERO).await
}

/// Mock upstream that waits `delay` before answering each request.
pub async fn start_slow_upstream(responder: Responder, delay: Duration) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let log = requests.clone();
    let app = Router::new().fallback(move |request: Request<Body>| {
        let log = log.clone();
        let responder = responder.clone();
        async move {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
            let recorded = Recorded {
                method: parts.method,
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.to_string())
                    .unwrap_or_default(),
                headers: parts.headers,
                body: body.to_vec(),
            };
            log.lock().unwrap().push(recorded.clone());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            responder(&recorded)
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, requests }
}

/// Upstream that answers every request with `404`.
#[allow(dead_code)]
pub fn not_found() -> Responder {
    Arc::new(|_| StatusCode::NOT_FOUND.into_response())
}

/// Registry mapping every domain to one page id.
pub struct FixedRegistry {
    page: String,
    calls: AtomicU32,
}

#[allow(dead_code)]
impl FixedRegistry {
    pub fn new(page: &str) -> Self {
        Self {
            page: page.to_string(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryRpc for FixedRegistry {
    async fn call_registry(&self, _data: AbiBytes) -> BlockchainResult<AbiBytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AbiBytes::from(
            ("0xowner".to_string(), self.page.clone()).abi_encode(),
        ))
    }
}

/// Running proxy under test.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub registry: Arc<FixedRegistry>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header(reqwest::header::HOST, DOMAIN)
    }

    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header(reqwest::header::HOST, DOMAIN)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config pointing the proxy at `upstream_url`, with metrics off.
pub fn test_config(upstream_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream_url.to_string();
    config.timeouts.upstream_secs = 2;
    config.observability.metrics_enabled = false;
    config
}

/// Start a proxy whose registry maps every domain to `page`.
pub async fn start_proxy(config: ProxyConfig, page: &str) -> TestProxy {
    let registry = Arc::new(FixedRegistry::new(page));
    let server = HttpServer::with_components(
        config,
        registry.clone(),
        Arc::new(MemoryPageCache::default()),
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestProxy {
        addr,
        registry,
        client,
        shutdown,
    }
}
