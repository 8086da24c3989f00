//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! DomainMapping
//!     → slugs.rs (validated slug ↔ page bijection, per request)
//! Request path + SlugTable
//!     → classifier.rs (ordered rules, first match wins)
//!     → RouteDecision (consumed once by the driver)
//! ```
//!
//! # Design Decisions
//! - No regex in the hot path (exact, prefix and suffix checks only)
//! - Deterministic: same path and table always give the same decision

pub mod classifier;
pub mod slugs;

pub use classifier::{classify, RouteDecision};
pub use slugs::{SlugTable, SlugTableError};
