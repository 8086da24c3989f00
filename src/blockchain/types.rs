//! Registry-specific types and error definitions.

use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Returned payload could not be ABI-decoded.
    #[error("ABI decode error: {0}")]
    Decode(String),

    /// Contract address in configuration is malformed.
    #[error("Invalid contract address: {0}")]
    InvalidAddress(String),
}

/// Result type for registry operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::Decode("buffer overrun".into());
        assert!(err.to_string().contains("buffer overrun"));
    }
}
