//! Responses synthesised without contacting the upstream.

use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::routing::slugs::SlugTable;

pub const UNREGISTERED_BODY: &str = "Your page is not registered. And this is under construction";

/// Placeholder for domains without a registry entry.
pub fn unregistered() -> Response {
    UNREGISTERED_BODY.into_response()
}

pub fn robots_txt(domain: &str) -> String {
    format!("Sitemap: https://{domain}/sitemap.xml")
}

/// One `<url><loc>` entry per known slug.
pub fn sitemap_xml(domain: &str, slugs: &SlugTable) -> String {
    let mut xml = String::from(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    for slug in slugs.slugs() {
        xml.push_str(&format!("<url><loc>https://{domain}/{slug}</loc></url>"));
    }
    xml.push_str("</urlset>");
    xml
}

pub fn robots_response(domain: &str) -> Response {
    robots_txt(domain).into_response()
}

pub fn sitemap_response(domain: &str, slugs: &SlugTable) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"))],
        sitemap_xml(domain, slugs),
    )
        .into_response()
}

/// Permanent redirect from a slug to its internal page id.
pub fn slug_redirect(domain: &str, page: &str) -> Response {
    let location = format!("https://{domain}/{page}");
    match HeaderValue::from_str(&location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response(),
    }
}
