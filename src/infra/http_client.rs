//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound clients are built here rather than with `reqwest::Client::new()`
//! so every call has a connect and a request timeout.

use reqwest::Client;
use std::time::Duration;

use crate::infra::error::InfraError;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default request timeout. The resilience layer enforces its own, shorter
/// deadline per read; this only bounds stray requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_client() -> Result<Client, InfraError> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .map_err(InfraError::HttpClient)
}
