//! Domain resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Host header
//!     → domain.rs (normalise, cache lookup)
//!     → cache.rs (hit: page id)
//!     → blockchain (miss: registry eth_call)
//!     → cache.rs (store positive result with TTL)
//!     → DomainMapping or unregistered
//! ```
//!
//! # Design Decisions
//! - Negative results are never cached, so new registrations show up at once
//! - Every failure degrades to "unregistered" for the current request
//! - Staleness is bounded by the TTL and accepted
//! - Concurrent misses for a domain share one registry lookup and its outcome

pub mod cache;
pub mod domain;

pub use cache::{CacheError, MemoryPageCache, PageCache};
pub use domain::{normalize_host, DomainMapping, DomainResolver, ResolverSettings};
