//! Domain registry integration subsystem.
//!
//! # Data Flow
//! ```text
//! domain
//!     → abi.rs (keccak hash, selector + bytes32 call data)
//!     → client.rs (eth_call with timeouts and failover)
//!     → abi.rs (decode (owner, page) tuple)
//! ```
//!
//! # Constraints
//! - Read-only: no keys, no transactions
//! - All RPC calls have configurable timeouts
//! - Failures surface as `BlockchainError`; callers decide how to degrade

pub mod abi;
pub mod client;
pub mod types;

pub use abi::{decode_domain_lookup, encode_domain_lookup, DomainRecord};
pub use client::{BlockchainClient, RegistryRpc};
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult};
