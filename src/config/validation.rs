//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: addresses parse, URLs use
//! an http(s) scheme, timeouts are non-zero. Every error is reported, not just
//! the first.

use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidSocketAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("blockchain.contract_address: invalid address '{0}'")]
    InvalidContractAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("upstream.public_host must not be empty")]
    EmptyPublicHost,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_http_url(&mut errors, "blockchain.rpc_url", &config.blockchain.rpc_url);
    for url in &config.blockchain.failover_urls {
        check_http_url(&mut errors, "blockchain.failover_urls", url);
    }
    check_http_url(&mut errors, "upstream.base_url", &config.upstream.base_url);

    if config.blockchain.contract_address.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidContractAddress(
            config.blockchain.contract_address.clone(),
        ));
    }

    if config.upstream.public_host.trim().is_empty() {
        errors.push(ValidationError::EmptyPublicHost);
    }

    let non_zero = [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.client_stall_secs", config.timeouts.client_stall_secs),
        ("blockchain.rpc_timeout_secs", config.blockchain.rpc_timeout_secs),
        ("cache.ttl_secs", config.cache.ttl_secs),
        ("cache.max_entries", config.cache.max_entries as u64),
        ("listener.max_body_bytes", config.listener.max_body_bytes as u64),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
