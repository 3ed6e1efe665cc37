use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    application::ports::product_catalog::{ProductCatalogClient, ProductFeed, Resolved, Source},
    domain::entities::product::{
        ProductListing, ProductSummary, fallback_product, fallback_products,
    },
    infra::resilience::{CircuitBreaker, ResilienceConfig, Resilient},
};

pub const PRODUCT_SERVICE: &str = "product-service";

/// Product feed backed by the product service, with caching, retries and a
/// circuit breaker shared by list and single-product reads.
pub struct ResilientCatalog {
    client: Arc<dyn ProductCatalogClient>,
    listings: Resilient<Vec<ProductSummary>>,
    products: Resilient<Option<ProductSummary>>,
}

impl ResilientCatalog {
    pub fn new(client: Arc<dyn ProductCatalogClient>, config: ResilienceConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(PRODUCT_SERVICE, config.circuit.clone()));
        Self {
            client,
            listings: Resilient::new(config.clone(), breaker.clone(), |v: &Vec<ProductSummary>| {
                !v.is_empty()
            }),
            products: Resilient::new(config, breaker, Option::is_some),
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        self.listings.breaker()
    }
}

#[async_trait]
impl ProductFeed for ResilientCatalog {
    async fn listing(&self, listing: ProductListing, limit: u32) -> Resolved<Vec<ProductSummary>> {
        let key = format!("{listing}:{limit}");
        self.listings
            .resolve(
                &key,
                || self.client.list(listing, limit),
                || fallback_products(listing.fallback_prefix(), limit as usize),
            )
            .await
    }

    async fn product(&self, product_id: &str) -> Resolved<ProductSummary> {
        let key = format!("product:{product_id}");
        let resolved = self
            .products
            .resolve(&key, || self.client.get(product_id), || None)
            .await;

        match resolved.value {
            Some(product) => Resolved::new(product, resolved.source),
            None => {
                if resolved.source != Source::Fallback {
                    tracing::warn!(product_id = %product_id, "Product not found upstream, serving placeholder");
                }
                Resolved::new(fallback_product(product_id), Source::Fallback)
            }
        }
    }
}
