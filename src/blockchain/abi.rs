//! Call/response codec for the domain registry contract.
//!
//! The lookup method takes the keccak-256 hash of the UTF-8 domain as a single
//! `bytes32` argument and returns an `(owner, page)` tuple of strings.

use alloy::primitives::{keccak256, Bytes, B256};
use alloy::sol_types::SolValue;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Method selector of the registry lookup function.
pub const LOOKUP_SELECTOR: [u8; 4] = [0x22, 0x1d, 0xef, 0xb1];

/// Decoded registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub owner: String,
    pub page: String,
}

/// Hash used as the registry key for a domain.
pub fn domain_hash(domain: &str) -> B256 {
    keccak256(domain.as_bytes())
}

/// Build `eth_call` data for a domain lookup: selector followed by the hash.
///
/// A `bytes32` argument is already one ABI word, so no padding is needed.
pub fn encode_domain_lookup(domain: &str) -> Bytes {
    let hash = domain_hash(domain);
    let mut data = Vec::with_capacity(LOOKUP_SELECTOR.len() + hash.len());
    data.extend_from_slice(&LOOKUP_SELECTOR);
    data.extend_from_slice(hash.as_slice());
    Bytes::from(data)
}

/// Decode the `(string, string)` tuple returned by the lookup.
pub fn decode_domain_lookup(data: &[u8]) -> BlockchainResult<DomainRecord> {
    let (owner, page) = <(String, String) as SolValue>::abi_decode(data)
        .map_err(|e| BlockchainError::Decode(e.to_string()))?;
    Ok(DomainRecord { owner, page })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let data = encode_domain_lookup("example.com");
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &LOOKUP_SELECTOR);
        assert_eq!(&data[4..], domain_hash("example.com").as_slice());
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(encode_domain_lookup("a.xyz"), encode_domain_lookup("a.xyz"));
        assert_ne!(encode_domain_lookup("a.xyz"), encode_domain_lookup("b.xyz"));
    }

    #[test]
    fn test_decode_registry_tuple() {
        let payload = ("0xowner".to_string(), "abcdef0123456789abcdef0123456789".to_string())
            .abi_encode();
        let record = decode_domain_lookup(&payload).unwrap();
        assert_eq!(record.owner, "0xowner");
        assert_eq!(record.page, "abcdef0123456789abcdef0123456789");
    }

    #[test]
    fn test_decode_empty_page() {
        let payload = (String::new(), String::new()).abi_encode();
        let record = decode_domain_lookup(&payload).unwrap();
        assert!(record.page.is_empty());
    }

    #[test]
    fn test_decode_undersized_payload() {
        assert!(matches!(
            decode_domain_lookup(&[]),
            Err(BlockchainError::Decode(_))
        ));
        assert!(decode_domain_lookup(&[0u8; 31]).is_err());
    }
}
