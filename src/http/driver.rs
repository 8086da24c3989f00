//! Per-request proxy state machine.
//!
//! # States
//! ```text
//! Start ──OPTIONS──────────────────────────────▶ Responded (CORS / Allow)
//!   │
//!   ▼
//! Resolved ──unregistered──────────────────────▶ Responded (placeholder)
//!   │
//!   ▼
//! Routed ──robots / sitemap / slug redirect────▶ Responded (local)
//!   │
//!   ▼
//! Forwarded ──asset / api / page───────────────▶ Responded (upstream)
//! ```
//!
//! Every request ends in exactly one response and one metrics record.

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderValue};
use axum::http::request::Parts;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PageConfig;
use crate::http::cors;
use crate::http::local;
use crate::http::request::{forwardable_headers, path_and_query, request_domain};
use crate::http::response::{self, is_html, strip_csp, upstream_headers};
use crate::http::upstream::{UpstreamClient, UpstreamError};
use crate::observability::metrics;
use crate::resolver::DomainResolver;
use crate::rewrite::{rewrite_stream, HostRebrand, RewriteContext};
use crate::routing::{classify, RouteDecision, SlugTable};

pub const ASSET_CONTENT_TYPE: &str = "application/x-javascript";

/// Everything a request needs once its domain is known.
struct Resolved {
    domain: String,
    slugs: SlugTable,
}

pub struct ProxyDriver {
    resolver: Arc<DomainResolver>,
    upstream: UpstreamClient,
    rebrand: HostRebrand,
    page: PageConfig,
    public_host: String,
    max_body_bytes: usize,
    client_stall: Duration,
}

impl ProxyDriver {
    pub fn new(
        resolver: Arc<DomainResolver>,
        upstream: UpstreamClient,
        public_host: impl Into<String>,
        page: PageConfig,
        max_body_bytes: usize,
        client_stall: Duration,
    ) -> Self {
        let public_host = public_host.into();
        Self {
            resolver,
            upstream,
            rebrand: HostRebrand::new(&public_host),
            page,
            public_host,
            max_body_bytes,
            client_stall,
        }
    }

    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();

        if method == Method::OPTIONS {
            let response = cors::options_response(request.headers());
            metrics::record_request(method.as_str(), response.status().as_u16(), "options", start);
            return response;
        }

        let (parts, body) = request.into_parts();
        let Some(domain) = request_domain(&parts) else {
            tracing::debug!(uri = %parts.uri, "Request without a host");
            metrics::record_request(method.as_str(), 400, "none", start);
            return (StatusCode::BAD_REQUEST, "Missing Host header").into_response();
        };

        let Some(mapping) = self.resolver.resolve(&domain).await else {
            let response = local::unregistered();
            metrics::record_request(method.as_str(), response.status().as_u16(), "unregistered", start);
            return response;
        };

        let resolved = Resolved {
            domain: mapping.domain,
            slugs: SlugTable::single(mapping.page),
        };
        let decision = classify(parts.uri.path(), &resolved.slugs);
        let route = decision.label();

        tracing::debug!(
            domain = %resolved.domain,
            method = %method,
            path = %parts.uri.path(),
            route = route,
            "Routing request"
        );

        let response = match decision {
            RouteDecision::RobotsTxt => local::robots_response(&resolved.domain),
            RouteDecision::Sitemap => local::sitemap_response(&resolved.domain, &resolved.slugs),
            RouteDecision::SlugRedirect(page) => local::slug_redirect(&resolved.domain, &page),
            RouteDecision::StaticAsset => {
                self.upstream_result(route, self.static_asset(&resolved, &parts).await)
            }
            RouteDecision::ApiForward => match self.read_body(body).await {
                Ok(bytes) => self.upstream_result(route, self.api_forward(&parts, bytes).await),
                Err(response) => response,
            },
            RouteDecision::PageProxy => match self.read_body(body).await {
                Ok(bytes) => {
                    self.upstream_result(route, self.page_proxy(resolved, parts, bytes).await)
                }
                Err(response) => response,
            },
        };

        metrics::record_request(method.as_str(), response.status().as_u16(), route, start);
        response
    }

    async fn read_body(&self, body: Body) -> Result<Bytes, Response> {
        axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected request body");
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
            })
    }

    fn upstream_result(&self, route: &'static str, result: Result<Response, UpstreamError>) -> Response {
        match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(route = route, error = %e, "Upstream error");
                metrics::record_upstream_error(route);
                (e.status(), "Upstream request failed").into_response()
            }
        }
    }

    /// Client bundle with every reference to the platform host pointed at
    /// the custom domain.
    async fn static_asset(&self, resolved: &Resolved, parts: &Parts) -> Result<Response, UpstreamError> {
        let upstream = self.upstream.fetch_asset(path_and_query(parts)).await?;
        let status = upstream.status();
        let mut headers = upstream_headers(upstream.headers());
        let text = upstream.text().await?;
        let body = self.rebrand.apply(&text, &resolved.domain);

        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::CONTENT_ENCODING);
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ASSET_CONTENT_TYPE));
        Ok(response::build(status, headers, Body::from(body)))
    }

    async fn api_forward(&self, parts: &Parts, body: Bytes) -> Result<Response, UpstreamError> {
        let upstream = self
            .upstream
            .forward_api(parts.uri.path(), path_and_query(parts), body)
            .await?;
        let status = upstream.status();
        let mut headers = upstream_headers(upstream.headers());
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        Ok(response::build(
            status,
            headers,
            Body::from_stream(upstream.bytes_stream()),
        ))
    }

    /// Proxied page: CSP removed, HTML rewritten as it streams through,
    /// anything else passed through untouched.
    async fn page_proxy(&self, resolved: Resolved, parts: Parts, body: Bytes) -> Result<Response, UpstreamError> {
        let upstream = self
            .upstream
            .forward_page(
                parts.method.clone(),
                forwardable_headers(&parts.headers),
                path_and_query(&parts),
                body,
            )
            .await?;
        let status = upstream.status();
        let mut headers = upstream_headers(upstream.headers());
        strip_csp(&mut headers);

        if !is_html(&headers) || parts.method == Method::HEAD {
            return Ok(response::build(
                status,
                headers,
                Body::from_stream(upstream.bytes_stream()),
            ));
        }

        headers.remove(header::CONTENT_LENGTH);
        let ctx = Arc::new(
            RewriteContext::new(resolved.domain, resolved.slugs, self.public_host.clone())
                .with_title(self.page.title.clone())
                .with_description(self.page.description.clone())
                .with_branding(self.page.branding.clone()),
        );
        let rewritten = rewrite_stream(ctx, upstream.bytes_stream(), self.client_stall);
        Ok(response::build(status, headers, Body::from_stream(rewritten)))
    }
}
