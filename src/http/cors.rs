//! Local answers to `OPTIONS` requests.
//!
//! A request carrying `Origin`, `Access-Control-Request-Method` and
//! `Access-Control-Request-Headers` is a CORS preflight and gets the CORS
//! policy; any other `OPTIONS` request gets a plain `Allow` list.

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::response::Response;

pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, PUT, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

pub fn is_preflight(headers: &HeaderMap) -> bool {
    headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS)
}

pub fn options_response(headers: &HeaderMap) -> Response {
    let mut response = Response::new(Body::empty());
    let out = response.headers_mut();
    if is_preflight(headers) {
        out.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        out.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        out.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
    } else {
        out.insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    }
    response
}
