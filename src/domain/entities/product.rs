use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Number of placeholder products served when the catalog is unreachable.
pub const MAX_FALLBACK_PRODUCTS: usize = 5;
const FALLBACK_PRICE_CENTS: i64 = 9_999;
const FALLBACK_RATING: f64 = 4.5;
const FALLBACK_REVIEW_COUNT: i32 = 150;
const PLACEHOLDER_IMAGE_BASE: &str = "https://via.placeholder.com/300x300?text=";

/// Curated product listings exposed by the catalog and the homepage carousels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductListing {
    Featured,
    Trending,
    Recommended,
    Random,
}

impl ProductListing {
    pub const ALL: [ProductListing; 4] = [
        ProductListing::Featured,
        ProductListing::Trending,
        ProductListing::Recommended,
        ProductListing::Random,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ProductListing::Featured => "Featured Products",
            ProductListing::Trending => "Trending Products",
            ProductListing::Recommended => "Recommended for You",
            ProductListing::Random => "Discover Products",
        }
    }

    pub fn view_all_link(&self) -> &'static str {
        match self {
            ProductListing::Featured => "/products?category=featured",
            ProductListing::Trending => "/products?category=trending",
            ProductListing::Recommended => "/products?category=recommended",
            ProductListing::Random => "/products",
        }
    }

    pub fn fallback_prefix(&self) -> &'static str {
        match self {
            ProductListing::Featured => "Featured Product",
            ProductListing::Trending => "Trending Product",
            ProductListing::Recommended => "Recommended Product",
            ProductListing::Random => "Random Product",
        }
    }

    /// Default page size when the caller doesn't pass `limit`.
    pub fn default_limit(&self) -> u32 {
        match self {
            ProductListing::Random => 15,
            _ => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub sale_price_cents: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: i32,
    pub in_stock: bool,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub quantity: i32,
}

/// Badge shown on a product tile; featured wins over trending, trending over sale.
pub fn product_badge(
    featured: bool,
    trending: bool,
    price_cents: i64,
    sale_price_cents: Option<i64>,
) -> Option<String> {
    if featured {
        Some("featured".to_string())
    } else if trending {
        Some("trending".to_string())
    } else if sale_price_cents.is_some_and(|sale| sale < price_cents) {
        Some("sale".to_string())
    } else {
        None
    }
}

/// Deterministic placeholder products: `"{prefix} 1"`, `"{prefix} 2"`, ...
/// capped at [`MAX_FALLBACK_PRODUCTS`].
pub fn fallback_products(prefix: &str, limit: usize) -> Vec<ProductSummary> {
    (1..=limit.min(MAX_FALLBACK_PRODUCTS))
        .map(|i| placeholder_product(&format!("{prefix} {i}")))
        .collect()
}

/// Placeholder for a single product the catalog couldn't return.
pub fn fallback_product(id: &str) -> ProductSummary {
    placeholder_product(&format!("Product {id}"))
}

fn placeholder_product(name: &str) -> ProductSummary {
    ProductSummary {
        id: format!("mock-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        brand: None,
        category: None,
        price_cents: FALLBACK_PRICE_CENTS,
        sale_price_cents: None,
        image_url: Some(format!("{PLACEHOLDER_IMAGE_BASE}{}", name.replace(' ', "+"))),
        rating: Some(FALLBACK_RATING),
        review_count: FALLBACK_REVIEW_COUNT,
        in_stock: true,
        badge: Some("featured".to_string()),
        quantity: 0,
    }
}
