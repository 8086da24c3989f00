//! Outbound response assembly.
//!
//! # Responsibilities
//! - Carry upstream status and headers over to the client response
//! - Strip hop-by-hop headers
//! - Remove content security policies from proxied pages
//!
//! # Design Decisions
//! - Bodies stay streams; only static assets are buffered for substitution
//! - Rewritten bodies lose `Content-Length` since their size changes

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::http::StatusCode;
use axum::response::Response;

use crate::http::request::HOP_BY_HOP;

/// Headers removed from proxied pages so injected markup can run.
pub const CSP_HEADERS: [&str; 2] = ["content-security-policy", "x-content-security-policy"];

/// Upstream headers minus hop-by-hop entries.
pub fn upstream_headers(headers: &HeaderMap) -> HeaderMap {
    let mut copied = headers.clone();
    for name in HOP_BY_HOP.iter() {
        copied.remove(name);
    }
    copied
}

pub fn strip_csp(headers: &mut HeaderMap) {
    for name in CSP_HEADERS {
        headers.remove(HeaderName::from_static(name));
    }
}

/// Whether the response declares an HTML body.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

pub fn build(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_csp() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Security-Policy", "default-src 'self'".parse().unwrap());
        headers.insert("X-Content-Security-Policy", "default-src 'self'".parse().unwrap());
        headers.insert("X-Frame-Options", "DENY".parse().unwrap());
        strip_csp(&mut headers);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_upstream_headers_drop_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());
        let copied = upstream_headers(&headers);
        assert!(copied.get(header::TRANSFER_ENCODING).is_none());
        assert!(copied.get(header::CONTENT_TYPE).is_some());
    }

    #[test]
    fn test_is_html() {
        let mut headers = HeaderMap::new();
        assert!(!is_html(&headers));
        headers.insert(header::CONTENT_TYPE, "Text/HTML; charset=utf-8".parse().unwrap());
        assert!(is_html(&headers));
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(!is_html(&headers));
    }
}
