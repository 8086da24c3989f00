//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Assemble the resolver, upstream client and driver from config
//! - Create the Axum router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown channel fires

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::RegistryRpc;
use crate::config::ProxyConfig;
use crate::http::driver::ProxyDriver;
use crate::http::upstream::{UpstreamClient, UpstreamError};
use crate::resolver::{DomainResolver, PageCache, ResolverSettings};

/// Failure while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("upstream client: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<ProxyDriver>,
}

/// HTTP server for the page proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Server resolving through `rpc` and caching mappings in `cache`.
    pub fn with_components(
        config: ProxyConfig,
        rpc: Arc<dyn RegistryRpc>,
        cache: Arc<dyn PageCache>,
    ) -> Result<Self, ServerError> {
        let settings = ResolverSettings {
            key_prefix: config.cache.key_prefix.clone(),
            ttl: Duration::from_secs(config.cache.ttl_secs),
            lookup_timeout: Duration::from_secs(config.blockchain.lookup_timeout_secs()),
        };
        let resolver = Arc::new(DomainResolver::new(rpc, cache, settings));
        let upstream = UpstreamClient::new(
            &config.upstream,
            Duration::from_secs(config.timeouts.upstream_secs),
        )?;
        let driver = Arc::new(ProxyDriver::new(
            resolver,
            upstream,
            config.upstream.public_host.clone(),
            config.page.clone(),
            config.listener.max_body_bytes,
            Duration::from_secs(config.timeouts.client_stall_secs),
        ));

        let router = Self::build_router(&config, AppState { driver });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            registry = %self.config.blockchain.contract_address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler; every request goes through the driver.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.driver.handle(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::BlockchainResult;
    use crate::http::local::UNREGISTERED_BODY;
    use crate::resolver::MemoryPageCache;
    use alloy::primitives::Bytes;
    use alloy::sol_types::SolValue;
    use async_trait::async_trait;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    const PAGE: &str = "abcdef0123456789abcdef0123456789";

    /// Registers every domain to the same page, or none when empty.
    struct FixedRegistry(&'static str);

    #[async_trait]
    impl RegistryRpc for FixedRegistry {
        async fn call_registry(&self, _data: Bytes) -> BlockchainResult<Bytes> {
            Ok(Bytes::from(
                ("0xowner".to_string(), self.0.to_string()).abi_encode(),
            ))
        }
    }

    fn server(page: &'static str) -> HttpServer {
        HttpServer::with_components(
            ProxyConfig::default(),
            Arc::new(FixedRegistry(page)),
            Arc::new(MemoryPageCache::default()),
        )
        .unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header(header::HOST, "pages.example.com")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_unregistered_domain_placeholder() {
        let response = server("").router.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, UNREGISTERED_BODY);
    }

    #[tokio::test]
    async fn test_robots_answered_locally() {
        let response = server(PAGE).router.oneshot(get("/robots.txt")).await.unwrap();
        assert_eq!(
            body_text(response).await,
            "Sitemap: https://pages.example.com/sitemap.xml"
        );
    }

    #[tokio::test]
    async fn test_root_redirects_to_page() {
        let response = server(PAGE).router.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            &format!("https://pages.example.com/{PAGE}")
        );
    }

    #[tokio::test]
    async fn test_options_skips_resolution() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/anything")
            .body(Body::empty())
            .unwrap();
        let response = server("").router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::ALLOW));
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let response = server(PAGE).router.oneshot(get("/robots.txt")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let request = Request::builder()
            .uri("/robots.txt")
            .header(header::HOST, "pages.example.com")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();
        let response = server(PAGE).router.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    }

    #[tokio::test]
    async fn test_missing_host_rejected() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = server(PAGE).router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
