//! Per-response rewrite inputs.

use crate::rewrite::navigation::NavigationPolicy;
use crate::routing::slugs::SlugTable;

/// Everything the rewriter needs for one response. Immutable once built.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Custom domain the page is served under.
    pub domain: String,
    /// Slug ↔ page table for the domain.
    pub slugs: SlugTable,
    /// Title override; empty disables the rule.
    pub title: String,
    /// Description override; empty disables the rule.
    pub description: String,
    /// Platform hostname restored in client-side API calls.
    pub upstream_host: String,
    /// Hidden footer text.
    pub branding: String,
}

impl RewriteContext {
    pub fn new(domain: impl Into<String>, slugs: SlugTable, upstream_host: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            slugs,
            title: String::new(),
            description: String::new(),
            upstream_host: upstream_host.into(),
            branding: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_branding(mut self, branding: impl Into<String>) -> Self {
        self.branding = branding.into();
        self
    }

    /// Navigation rules the injected script applies for this response.
    pub fn navigation(&self) -> NavigationPolicy<'_> {
        NavigationPolicy::new(&self.slugs, &self.domain, &self.upstream_host)
    }

    /// Canonical URL of the custom domain.
    pub fn canonical_url(&self) -> String {
        format!("https://{}", self.domain)
    }
}
