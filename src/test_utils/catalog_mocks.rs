//! In-memory mocks for products, inventory, the product feed and carts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::{
        ports::product_catalog::{
            DownstreamError, ProductCatalogClient, ProductFeed, Resolved, Source,
        },
        use_cases::{
            cart::CartStore,
            inventory::InventoryRepo,
            products::{PageRequest, ProductRepo},
        },
    },
    domain::entities::{
        cart::Cart,
        inventory::{InventoryChange, InventoryOp, InventoryRecord},
        product::{ProductListing, ProductSummary, fallback_product, product_badge},
    },
};

// ============================================================================
// InMemoryProductRepo
// ============================================================================

/// Curation flags stored beside a product.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingFlags {
    pub featured: bool,
    pub trending: bool,
    pub recommended: bool,
}

impl ListingFlags {
    fn matches(&self, listing: ProductListing) -> bool {
        match listing {
            ProductListing::Featured => self.featured,
            ProductListing::Trending => self.trending,
            ProductListing::Recommended => self.recommended,
            ProductListing::Random => true,
        }
    }
}

#[derive(Default)]
pub struct InMemoryProductRepo {
    pub products: Mutex<Vec<(ProductSummary, ListingFlags)>>,
}

impl InMemoryProductRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `product` with the flags set by `flags`; the badge is derived
    /// the same way the database mapper derives it.
    pub fn insert(&self, mut product: ProductSummary, flags: impl FnOnce(&mut ListingFlags)) {
        let mut listing_flags = ListingFlags::default();
        flags(&mut listing_flags);
        product.badge = product_badge(
            listing_flags.featured,
            listing_flags.trending,
            product.price_cents,
            product.sale_price_cents,
        );
        self.products.lock().unwrap().push((product, listing_flags));
    }

    fn page(
        &self,
        page: PageRequest,
        filter: impl Fn(&ProductSummary) -> bool,
    ) -> Vec<ProductSummary> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p)
            .filter(|p| filter(p))
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductRepo for InMemoryProductRepo {
    async fn list(&self, listing: ProductListing, limit: u32) -> AppResult<Vec<ProductSummary>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, flags)| flags.matches(listing))
            .take(limit as usize)
            .map(|(p, _)| p.clone())
            .collect())
    }

    async fn get(&self, product_id: Uuid) -> AppResult<Option<ProductSummary>> {
        let id = product_id.to_string();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p.id == id)
            .map(|(p, _)| p.clone()))
    }

    async fn search(&self, query: &str, page: PageRequest) -> AppResult<Vec<ProductSummary>> {
        let needle = query.trim().to_lowercase();
        Ok(self.page(page, |p| {
            p.name.to_lowercase().contains(&needle)
                || p
                    .brand
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle))
        }))
    }

    async fn list_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> AppResult<Vec<ProductSummary>> {
        Ok(self.page(page, |p| {
            p.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        }))
    }
}

// ============================================================================
// InMemoryInventoryRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryInventoryRepo {
    pub records: Mutex<HashMap<Uuid, InventoryRecord>>,
}

impl InMemoryInventoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<InventoryRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().map(|r| (r.product_id, r)).collect()),
        }
    }
}

#[async_trait]
impl InventoryRepo for InMemoryInventoryRepo {
    async fn get(&self, product_id: Uuid) -> AppResult<Option<InventoryRecord>> {
        Ok(self.records.lock().unwrap().get(&product_id).cloned())
    }

    async fn apply(&self, product_id: Uuid, op: InventoryOp) -> AppResult<Option<InventoryChange>> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&product_id) else {
            return Ok(None);
        };
        let applied = record.apply(op);
        Ok(Some(InventoryChange {
            applied,
            record: record.clone(),
        }))
    }
}

// ============================================================================
// StaticProductFeed
// ============================================================================

/// Always-healthy feed over products `static-1..=static-n`.
pub struct StaticProductFeed {
    products: Vec<ProductSummary>,
}

impl StaticProductFeed {
    pub fn live(count: usize) -> Self {
        let products = (1..=count)
            .map(|i| ProductSummary {
                id: format!("static-{i}"),
                name: format!("Static Product {i}"),
                brand: None,
                category: None,
                price_cents: 1_000 + i as i64,
                sale_price_cents: None,
                image_url: None,
                rating: None,
                review_count: 0,
                in_stock: true,
                badge: None,
                quantity: 10,
            })
            .collect();
        Self { products }
    }
}

#[async_trait]
impl ProductFeed for StaticProductFeed {
    async fn listing(&self, _listing: ProductListing, limit: u32) -> Resolved<Vec<ProductSummary>> {
        Resolved::new(
            self.products.iter().take(limit as usize).cloned().collect(),
            Source::Live,
        )
    }

    async fn product(&self, product_id: &str) -> Resolved<ProductSummary> {
        match self.products.iter().find(|p| p.id == product_id) {
            Some(product) => Resolved::new(product.clone(), Source::Live),
            None => Resolved::new(fallback_product(product_id), Source::Fallback),
        }
    }
}

// ============================================================================
// ScriptedCatalogClient
// ============================================================================

/// Product-service client that either serves a fixed product list or fails
/// every call with the same error. Counts calls for assertions.
pub struct ScriptedCatalogClient {
    outcome: Result<Vec<ProductSummary>, DownstreamError>,
    list_calls: AtomicU32,
    get_calls: AtomicU32,
}

impl ScriptedCatalogClient {
    pub fn healthy(products: Vec<ProductSummary>) -> Self {
        Self {
            outcome: Ok(products),
            list_calls: AtomicU32::new(0),
            get_calls: AtomicU32::new(0),
        }
    }

    pub fn failing(error: DownstreamError) -> Self {
        Self {
            outcome: Err(error),
            list_calls: AtomicU32::new(0),
            get_calls: AtomicU32::new(0),
        }
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> u32 {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalogClient for ScriptedCatalogClient {
    async fn list(
        &self,
        _listing: ProductListing,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, DownstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let products = self.outcome.as_ref().map_err(Clone::clone)?;
        Ok(products.iter().take(limit as usize).cloned().collect())
    }

    async fn get(&self, product_id: &str) -> Result<Option<ProductSummary>, DownstreamError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let products = self.outcome.as_ref().map_err(Clone::clone)?;
        Ok(products.iter().find(|p| p.id == product_id).cloned())
    }
}

// ============================================================================
// InMemoryCartStore
// ============================================================================

#[derive(Default)]
pub struct InMemoryCartStore {
    pub carts: Mutex<HashMap<Uuid, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        Ok(self.carts.lock().unwrap().get(&user_id).cloned())
    }

    async fn save(&self, cart: &Cart, expected_version: u64) -> AppResult<bool> {
        let mut carts = self.carts.lock().unwrap();
        let stored_version = carts.get(&cart.user_id).map_or(0, |c| c.version);
        if stored_version != expected_version {
            return Ok(false);
        }
        carts.insert(cart.user_id, cart.clone());
        Ok(true)
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        self.carts.lock().unwrap().remove(&user_id);
        Ok(())
    }
}
