//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! upstream HTML stream + RewriteContext
//!     → html.rs (lol_html, element at a time)
//!         title/meta → meta.rs (metadata rules)
//!         head       → chrome.rs (style block)
//!         body       → chrome.rs (branding + navigation script)
//!     → rewritten stream to the client
//!
//! upstream client bundle
//!     → asset.rs (platform host → custom domain)
//! ```
//!
//! # Design Decisions
//! - Rules never look past the current element
//! - Malformed markup is passed through; unmatched rules are skipped
//! - Client navigation behaviour is modelled in navigation.rs and the
//!   injected script follows that model

pub mod asset;
pub mod chrome;
pub mod context;
pub mod html;
pub mod meta;
pub mod navigation;

pub use asset::HostRebrand;
pub use context::RewriteContext;
pub use html::{rewrite_html, rewrite_stream};
