//! Inbound request inspection.
//!
//! # Responsibilities
//! - Extract the custom domain (Host header, falling back to the URI)
//! - Prepare headers for forwarding to the upstream platform
//!
//! # Design Decisions
//! - `Host` is never forwarded; the upstream client sets its own
//! - `Accept-Encoding` is dropped so HTML arrives uncompressed for rewriting

use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::request::Parts;

use crate::resolver::normalize_host;

/// Request headers that are meaningful only for a single hop.
pub const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Custom domain the request was addressed to.
pub fn request_domain(parts: &Parts) -> Option<String> {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.host())?;
    let domain = normalize_host(host);
    (!domain.is_empty()).then_some(domain)
}

/// Path and query string to forward, defaulting to `/`.
pub fn path_and_query(parts: &Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
}

/// Copy of the caller's headers suitable for the upstream request.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP.iter() {
        forwarded.remove(name);
    }
    forwarded.remove(header::HOST);
    forwarded.remove(header::CONTENT_LENGTH);
    forwarded.remove(header::ACCEPT_ENCODING);
    forwarded
}
