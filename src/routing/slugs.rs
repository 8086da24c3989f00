//! Slug ↔ page bijection.
//!
//! Built fresh for every request from the resolved mapping. Construction
//! rejects duplicate slugs and duplicate page ids so lookups in both
//! directions are unambiguous.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Invalid slug table input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugTableError {
    #[error("duplicate slug '{0}'")]
    DuplicateSlug(String),

    #[error("page '{0}' is mapped by more than one slug")]
    DuplicatePage(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugTable {
    slug_to_page: BTreeMap<String, String>,
    page_to_slug: BTreeMap<String, String>,
}

impl SlugTable {
    /// Table mapping the root slug (`""`) to `page`.
    pub fn single(page: impl Into<String>) -> Self {
        let page = page.into();
        let mut table = Self::default();
        table.slug_to_page.insert(String::new(), page.clone());
        table.page_to_slug.insert(page, String::new());
        table
    }

    /// Build a table from `(slug, page)` pairs.
    pub fn from_pairs<I, S, P>(pairs: I) -> Result<Self, SlugTableError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<String>,
    {
        let mut table = Self::default();
        for (slug, page) in pairs {
            let (slug, page) = (slug.into(), page.into());
            if table.slug_to_page.contains_key(&slug) {
                return Err(SlugTableError::DuplicateSlug(slug));
            }
            if table.page_to_slug.contains_key(&page) {
                return Err(SlugTableError::DuplicatePage(page));
            }
            table.slug_to_page.insert(slug.clone(), page.clone());
            table.page_to_slug.insert(page, slug);
        }
        Ok(table)
    }

    pub fn page_for_slug(&self, slug: &str) -> Option<&str> {
        self.slug_to_page.get(slug).map(String::as_str)
    }

    pub fn slug_for_page(&self, page: &str) -> Option<&str> {
        self.page_to_slug.get(page).map(String::as_str)
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.slug_to_page.contains_key(slug)
    }

    /// Slugs in sorted order (the root slug first).
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.slug_to_page.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slug_to_page.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slug_to_page.is_empty()
    }
}

/// Serializes as the `{ slug: page }` object the client script consumes.
impl Serialize for SlugTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slug_to_page.len()))?;
        for (slug, page) in &self.slug_to_page {
            map.serialize_entry(slug, page)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "abcdef0123456789abcdef0123456789";

    #[test]
    fn test_single_root_slug() {
        let table = SlugTable::single(PAGE);
        assert_eq!(table.len(), 1);
        assert_eq!(table.page_for_slug(""), Some(PAGE));
        assert_eq!(table.slug_for_page(PAGE), Some(""));
    }

    #[test]
    fn test_from_pairs_bijection() {
        let table = SlugTable::from_pairs([("", PAGE), ("about", "0123")]).unwrap();
        assert_eq!(table.slug_for_page("0123"), Some("about"));
        assert_eq!(table.slugs().collect::<Vec<_>>(), vec!["", "about"]);
    }

    #[test]
    fn test_rejects_duplicate_slug() {
        let err = SlugTable::from_pairs([("about", "p1"), ("about", "p2")]).unwrap_err();
        assert_eq!(err, SlugTableError::DuplicateSlug("about".into()));
    }

    #[test]
    fn test_rejects_duplicate_page() {
        let err = SlugTable::from_pairs([("a", "p1"), ("b", "p1")]).unwrap_err();
        assert_eq!(err, SlugTableError::DuplicatePage("p1".into()));
    }

    #[test]
    fn test_serializes_as_object() {
        let table = SlugTable::from_pairs([("", "p0"), ("blog", "p1")]).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"":"p0","blog":"p1"}"#);
    }
}
