use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::product::{ProductListing, ProductSummary};

/// Failure talking to a downstream service. Never surfaces past the
/// resilience layer; it only drives retries, the breaker and fallbacks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DownstreamError {
    #[error("call timed out")]
    Timeout,

    #[error("circuit open")]
    CircuitOpen,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Where an aggregated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Live,
    Cached,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }
}

/// Raw client for the product service. Errors are returned as-is.
#[async_trait]
pub trait ProductCatalogClient: Send + Sync {
    async fn list(
        &self,
        listing: ProductListing,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, DownstreamError>;

    async fn get(&self, product_id: &str) -> Result<Option<ProductSummary>, DownstreamError>;
}

/// Product reads as the storefront sees them: always answer, degrading
/// to cached or placeholder data when the product service misbehaves.
#[async_trait]
pub trait ProductFeed: Send + Sync {
    async fn listing(&self, listing: ProductListing, limit: u32) -> Resolved<Vec<ProductSummary>>;

    async fn product(&self, product_id: &str) -> Resolved<ProductSummary>;
}
