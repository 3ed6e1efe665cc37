use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::product::{ProductListing, ProductSummary},
};

pub const MAX_LISTING_LIMIT: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

#[async_trait]
pub trait ProductRepo: Send + Sync {
    /// Active, public products for a curated listing.
    async fn list(&self, listing: ProductListing, limit: u32) -> AppResult<Vec<ProductSummary>>;
    async fn get(&self, product_id: Uuid) -> AppResult<Option<ProductSummary>>;
    /// Case-insensitive match on name, brand or description.
    async fn search(&self, query: &str, page: PageRequest) -> AppResult<Vec<ProductSummary>>;
    async fn list_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> AppResult<Vec<ProductSummary>>;
}

/// Read side of the product catalog.
#[derive(Clone)]
pub struct ProductUseCases {
    repo: Arc<dyn ProductRepo>,
}

impl ProductUseCases {
    pub fn new(repo: Arc<dyn ProductRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn listing(
        &self,
        listing: ProductListing,
        limit: Option<u32>,
    ) -> AppResult<Vec<ProductSummary>> {
        let limit = limit.unwrap_or_else(|| listing.default_limit());
        validate_limit(limit)?;
        self.repo.list(listing, limit).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> AppResult<ProductSummary> {
        self.repo.get(product_id).await?.ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, page: PageRequest) -> AppResult<Vec<ProductSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Search query must not be empty".into()));
        }
        validate_page(page)?;
        self.repo.search(query, page).await
    }

    #[instrument(skip(self))]
    pub async fn by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> AppResult<Vec<ProductSummary>> {
        validate_page(page)?;
        self.repo.list_by_category(category, page).await
    }
}

pub fn validate_limit(limit: u32) -> AppResult<()> {
    if !(1..=MAX_LISTING_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {MAX_LISTING_LIMIT}"
        )));
    }
    Ok(())
}

fn validate_page(page: PageRequest) -> AppResult<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&page.size) {
        return Err(AppError::InvalidInput(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}
