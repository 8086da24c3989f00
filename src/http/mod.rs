//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → driver.rs (OPTIONS, resolve domain, classify route)
//!     → cors.rs / local.rs (answered locally)
//!     → upstream.rs (platform fetch)
//!     → response.rs (header filtering, CSP removal)
//!     → rewrite (HTML streaming rewrite)
//!     → Send to client
//! ```

pub mod cors;
pub mod driver;
pub mod local;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use driver::ProxyDriver;
pub use server::{HttpServer, ServerError};
pub use upstream::{UpstreamClient, UpstreamError};
