//! Per-request route classification.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! | # | Predicate                         | Decision       |
//! |---|-----------------------------------|----------------|
//! | 1 | `/robots.txt`                     | `RobotsTxt`    |
//! | 2 | `/sitemap.xml`                    | `Sitemap`      |
//! | 3 | starts `/app`, ends `js`          | `StaticAsset`  |
//! | 4 | starts `/api`                     | `ApiForward`   |
//! | 5 | path minus `/` is a known slug    | `SlugRedirect` |
//! | 6 | anything else                     | `PageProxy`    |
//!
//! `/api` paths are never slug-checked, and a slug spelled like `app…js` is
//! taken for a static asset. Both are accepted consequences of the ordering.

use crate::routing::slugs::SlugTable;

/// How a request is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    RobotsTxt,
    Sitemap,
    /// Client bundle fetched upstream and rebranded.
    StaticAsset,
    /// Platform API call forwarded as a JSON POST.
    ApiForward,
    /// Known slug; redirect to its internal page id.
    SlugRedirect(String),
    /// Anything else, proxied and HTML-rewritten.
    PageProxy,
}

impl RouteDecision {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteDecision::RobotsTxt => "robots",
            RouteDecision::Sitemap => "sitemap",
            RouteDecision::StaticAsset => "static_asset",
            RouteDecision::ApiForward => "api",
            RouteDecision::SlugRedirect(_) => "slug_redirect",
            RouteDecision::PageProxy => "page",
        }
    }
}

/// Classify a request path against the slug table.
pub fn classify(path: &str, slugs: &SlugTable) -> RouteDecision {
    if path == "/robots.txt" {
        return RouteDecision::RobotsTxt;
    }
    if path == "/sitemap.xml" {
        return RouteDecision::Sitemap;
    }
    if path.starts_with("/app") && path.ends_with("js") {
        return RouteDecision::StaticAsset;
    }
    if path.starts_with("/api") {
        return RouteDecision::ApiForward;
    }
    let slug = path.strip_prefix('/').unwrap_or(path);
    if let Some(page) = slugs.page_for_slug(slug) {
        return RouteDecision::SlugRedirect(page.to_string());
    }
    RouteDecision::PageProxy
}
