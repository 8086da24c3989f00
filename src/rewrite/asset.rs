//! Client bundle rebranding.
//!
//! Upstream scripts hard-code the platform host. Every literal occurrence of
//! the host, with or without its `www.` prefix, is replaced with the custom
//! domain in a single left-to-right pass, so text that was just written is
//! never matched again.

/// Host substitution for static assets.
#[derive(Debug, Clone)]
pub struct HostRebrand {
    bare: String,
}

impl HostRebrand {
    /// `public_host` may be given with or without the `www.` prefix.
    pub fn new(public_host: &str) -> Self {
        let bare = public_host
            .strip_prefix("www.")
            .unwrap_or(public_host)
            .to_string();
        Self { bare }
    }

    pub fn apply(&self, body: &str, domain: &str) -> String {
        if self.bare.is_empty() {
            return body.to_string();
        }

        let mut out = String::with_capacity(body.len());
        let mut rest = body;
        while let Some(pos) = rest.find(&self.bare) {
            let before = &rest[..pos];
            out.push_str(before.strip_suffix("www.").unwrap_or(before));
            out.push_str(domain);
            rest = &rest[pos + self.bare.len()..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_platform_host_remains() {
        let rebrand = HostRebrand::new("www.notion.so");
        let body = r#"var a="https://www.notion.so/api";var b="notion.so";fetch("//www.notion.so")"#;
        let out = rebrand.apply(body, "example.com");

        assert_eq!(out.matches("notion.so").count(), 0);
        assert_eq!(
            out,
            r#"var a="https://example.com/api";var b="example.com";fetch("//example.com")"#
        );
    }

    #[test]
    fn test_bare_host_configuration() {
        let rebrand = HostRebrand::new("notion.so");
        assert_eq!(rebrand.apply("www.notion.so notion.so", "x.io"), "x.io x.io");
    }

    #[test]
    fn test_untouched_without_host() {
        let rebrand = HostRebrand::new("www.notion.so");
        assert_eq!(rebrand.apply("console.log(1)", "example.com"), "console.log(1)");
    }

    #[test]
    fn test_domain_containing_host_is_written_once() {
        let rebrand = HostRebrand::new("www.notion.so");
        let body = r#"a="https://www.notion.so/x";b="notion.so""#;
        assert_eq!(
            rebrand.apply(body, "notion.so.example.com"),
            r#"a="https://notion.so.example.com/x";b="notion.so.example.com""#
        );
    }

    #[test]
    fn test_empty_host_is_a_no_op() {
        let rebrand = HostRebrand::new("www.");
        assert_eq!(rebrand.apply("www.notion.so", "x.io"), "www.notion.so");
    }
}
