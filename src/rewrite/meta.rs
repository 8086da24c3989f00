//! Metadata rules for `<title>` and `<meta>` elements.
//!
//! Rules are independent: one element can collect several edits. Evaluation
//! only looks at the element itself, never ahead in the document.

use crate::rewrite::context::RewriteContext;

/// Change to apply to a matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEdit {
    /// Set the `content` attribute.
    SetContent(String),
    /// Replace the element's text.
    SetText(String),
    /// Drop the element.
    Remove,
}

/// Compute edits for an element given its tag and an attribute accessor.
pub fn meta_edits<F>(tag: &str, attr: F, ctx: &RewriteContext) -> Vec<MetaEdit>
where
    F: Fn(&str) -> Option<String>,
{
    let property = attr("property");
    let name = attr("name");
    let property_is = |v: &str| property.as_deref() == Some(v);
    let name_is = |v: &str| name.as_deref() == Some(v);

    let mut edits = Vec::new();

    if !ctx.title.is_empty() {
        if property_is("og:title") || name_is("twitter:title") {
            edits.push(MetaEdit::SetContent(ctx.title.clone()));
        }
        if tag.eq_ignore_ascii_case("title") {
            edits.push(MetaEdit::SetText(ctx.title.clone()));
        }
    }

    if !ctx.description.is_empty()
        && (name_is("description")
            || property_is("og:description")
            || name_is("twitter:description"))
    {
        edits.push(MetaEdit::SetContent(ctx.description.clone()));
    }

    if property_is("og:url") || name_is("twitter:url") {
        edits.push(MetaEdit::SetContent(ctx.canonical_url()));
    }

    if name_is("apple-itunes-app") {
        edits.push(MetaEdit::Remove);
    }

    edits
}
