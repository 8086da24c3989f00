//! Client-side navigation model.
//!
//! The injected script runs inside the upstream single-page app and has to
//! keep the address bar on the custom domain's slug space. Its behaviour is
//! modelled here in plain Rust so it can be tested without a browser; the
//! script in `chrome.rs` is rendered from a `NavigationPolicy` and implements
//! exactly these decisions.
//!
//! - `NavigationGate`: initialisation runs once, the first time the app's
//!   navigation container is available.
//! - `NavigationPolicy`: what to do with `history.replaceState`,
//!   `history.pushState` and `XMLHttpRequest.open` calls made by the app.

use crate::routing::slugs::SlugTable;

/// Title argument that marks a `replaceState` call as issued by the proxy
/// script itself.
pub const BYPASS_MARKER: &str = "bypass";

/// Length of an upstream page id at the end of a path.
pub const PAGE_ID_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Waiting,
    Initialized,
}

/// One-shot initialisation gate.
#[derive(Debug, Clone)]
pub struct NavigationGate {
    state: GateState,
}

impl NavigationGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Waiting,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Feed a DOM change notification. Returns `true` exactly once: on the
    /// first notification where the container is available.
    pub fn observe(&mut self, container_available: bool) -> bool {
        match self.state {
            GateState::Waiting if container_available => {
                self.state = GateState::Initialized;
                true
            }
            _ => false,
        }
    }
}

impl Default for NavigationGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of an intercepted `history.replaceState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceDecision {
    Apply,
    Discard,
}

/// Interception rules for one page load.
#[derive(Debug, Clone, Copy)]
pub struct NavigationPolicy<'a> {
    slugs: &'a SlugTable,
    domain: &'a str,
    upstream_host: &'a str,
}

impl<'a> NavigationPolicy<'a> {
    pub fn new(slugs: &'a SlugTable, domain: &'a str, upstream_host: &'a str) -> Self {
        Self {
            slugs,
            domain,
            upstream_host,
        }
    }

    pub fn slugs(&self) -> &'a SlugTable {
        self.slugs
    }

    pub fn domain(&self) -> &'a str {
        self.domain
    }

    /// Platform host the app's API calls are sent back to.
    pub fn upstream_host(&self) -> &'a str {
        self.upstream_host
    }

    /// Trailing page id of a path (the whole path when shorter).
    pub fn page_id_of(path: &str) -> &str {
        let start = path.len().saturating_sub(PAGE_ID_LEN);
        path.get(start..).unwrap_or(path)
    }

    fn slug_of(path: &str) -> &str {
        path.strip_prefix('/').unwrap_or(path)
    }

    /// Slug URL to show for the current location, if it is a known page.
    pub fn slug_location(&self, current_path: &str) -> Option<String> {
        self.slugs
            .slug_for_page(Self::page_id_of(current_path))
            .map(|slug| format!("/{slug}"))
    }

    /// Internal page URL to restore before the app handles a `popstate`
    /// landing on a slug URL.
    pub fn popstate_location(&self, current_path: &str) -> Option<String> {
        self.slugs
            .page_for_slug(Self::slug_of(current_path))
            .map(|page| format!("/{page}"))
    }

    /// The app's own replacements are dropped while a slug URL is showing;
    /// bypass-tagged calls always go through.
    pub fn on_replace_state(&self, current_path: &str, title: Option<&str>) -> ReplaceDecision {
        if title == Some(BYPASS_MARKER) {
            return ReplaceDecision::Apply;
        }
        if self.slugs.contains_slug(Self::slug_of(current_path)) {
            ReplaceDecision::Discard
        } else {
            ReplaceDecision::Apply
        }
    }

    /// Destination to push instead of `target_path`, when it names a known page.
    pub fn on_push_state(&self, target_path: &str) -> Option<String> {
        self.slug_location(target_path)
    }

    /// Point the app's API requests back at the platform host.
    pub fn on_xhr_open(&self, url: &str) -> String {
        url.replacen(self.domain, self.upstream_host, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "abcdef0123456789abcdef0123456789";

    fn table() -> SlugTable {
        SlugTable::from_pairs([("", PAGE), ("blog", "0123456789abcdef0123456789abcdef")]).unwrap()
    }

    #[test]
    fn test_gate_fires_once() {
        let mut gate = NavigationGate::new();
        assert!(!gate.observe(false));
        assert_eq!(gate.state(), GateState::Waiting);
        assert!(gate.observe(true));
        assert_eq!(gate.state(), GateState::Initialized);
        assert!(!gate.observe(true));
        assert!(!gate.observe(false));
    }

    #[test]
    fn test_page_id_of() {
        assert_eq!(NavigationPolicy::page_id_of(&format!("/My-Page-{PAGE}")), PAGE);
        assert_eq!(NavigationPolicy::page_id_of("/"), "/");
    }

    #[test]
    fn test_slug_location() {
        let slugs = table();
        let policy = NavigationPolicy::new(&slugs, "example.com", "www.notion.so");
        assert_eq!(policy.slug_location(&format!("/{PAGE}")).as_deref(), Some("/"));
        assert_eq!(
            policy
                .slug_location("/Blog-0123456789abcdef0123456789abcdef")
                .as_deref(),
            Some("/blog")
        );
        assert_eq!(policy.slug_location("/ffffffffffffffffffffffffffffffff"), None);
    }

    #[test]
    fn test_replace_state_vetoed_on_slug() {
        let slugs = table();
        let policy = NavigationPolicy::new(&slugs, "example.com", "www.notion.so");
        assert_eq!(policy.on_replace_state("/", None), ReplaceDecision::Discard);
        assert_eq!(policy.on_replace_state("/blog", Some("")), ReplaceDecision::Discard);
        assert_eq!(
            policy.on_replace_state("/", Some(BYPASS_MARKER)),
            ReplaceDecision::Apply
        );
        assert_eq!(
            policy.on_replace_state(&format!("/{PAGE}"), None),
            ReplaceDecision::Apply
        );
    }

    #[test]
    fn test_push_state_rewrites_known_pages() {
        let slugs = table();
        let policy = NavigationPolicy::new(&slugs, "example.com", "www.notion.so");
        assert_eq!(
            policy.on_push_state("/Blog-0123456789abcdef0123456789abcdef").as_deref(),
            Some("/blog")
        );
        assert_eq!(policy.on_push_state("/Other-ffffffffffffffffffffffffffffffff"), None);
    }

    #[test]
    fn test_popstate_location() {
        let slugs = table();
        let policy = NavigationPolicy::new(&slugs, "example.com", "www.notion.so");
        assert_eq!(
            policy.popstate_location("/").as_deref(),
            Some(format!("/{PAGE}").as_str())
        );
        assert_eq!(policy.popstate_location("/unknown"), None);
    }

    #[test]
    fn test_xhr_points_back_upstream() {
        let slugs = table();
        let policy = NavigationPolicy::new(&slugs, "example.com", "www.notion.so");
        assert_eq!(
            policy.on_xhr_open("https://example.com/api/v3/loadPageChunk"),
            "https://www.notion.so/api/v3/loadPageChunk"
        );
        assert_eq!(policy.on_xhr_open("/api/v3/syncRecordValues"), "/api/v3/syncRecordValues");
    }
}
