use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::{
    application::ports::product_catalog::{DownstreamError, ProductCatalogClient},
    domain::entities::product::{ProductListing, ProductSummary},
};

/// HTTP client for the product service's `/api/v1/products` endpoints.
#[derive(Clone)]
pub struct HttpProductCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpProductCatalogClient {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, DownstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DownstreamError::Transport(format!("invalid base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "products", path]);
        Ok(url)
    }
}

fn transport_error(err: reqwest::Error) -> DownstreamError {
    if err.is_timeout() {
        DownstreamError::Timeout
    } else if err.is_decode() {
        DownstreamError::Decode(err.to_string())
    } else {
        DownstreamError::Transport(err.to_string())
    }
}

#[async_trait]
impl ProductCatalogClient for HttpProductCatalogClient {
    async fn list(
        &self,
        listing: ProductListing,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, DownstreamError> {
        let url = self.endpoint(listing.as_ref())?;

        let resp = self
            .client
            .get(url)
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(DownstreamError::Status(resp.status().as_u16()));
        }

        resp.json::<Vec<ProductSummary>>()
            .await
            .map_err(transport_error)
    }

    async fn get(&self, product_id: &str) -> Result<Option<ProductSummary>, DownstreamError> {
        let url = self.endpoint(product_id)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => resp
                .json::<ProductSummary>()
                .await
                .map(Some)
                .map_err(transport_error),
            status => Err(DownstreamError::Status(status.as_u16())),
        }
    }
}
