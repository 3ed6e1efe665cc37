use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::product_catalog::{ProductFeed, Source},
        use_cases::products::validate_limit,
    },
    domain::entities::product::{ProductListing, ProductSummary},
};

pub const DEFAULT_CAROUSEL_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCarousel {
    pub title: String,
    pub products: Vec<ProductSummary>,
    pub view_all_link: String,
    /// Where the products came from; logged, never sent to clients.
    #[serde(skip)]
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroCard {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterBanner {
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Storefront homepage aggregation.
#[derive(Clone)]
pub struct HomepageUseCases {
    feed: Arc<dyn ProductFeed>,
}

impl HomepageUseCases {
    pub fn new(feed: Arc<dyn ProductFeed>) -> Self {
        Self { feed }
    }

    #[instrument(skip(self))]
    pub async fn product_carousel(
        &self,
        carousel_type: &str,
        limit: Option<u32>,
    ) -> AppResult<ProductCarousel> {
        let listing: ProductListing = carousel_type.parse().map_err(|_| {
            AppError::InvalidInput(
                "Invalid carousel type. Must be: featured, trending, recommended, or random"
                    .to_string(),
            )
        })?;
        let limit = limit.unwrap_or(DEFAULT_CAROUSEL_LIMIT);
        validate_limit(limit)?;

        let resolved = self.feed.listing(listing, limit).await;
        Ok(ProductCarousel {
            title: listing.title().to_string(),
            products: resolved.value,
            view_all_link: listing.view_all_link().to_string(),
            source: resolved.source,
        })
    }

    /// A single product tile; never fails, degrading to a placeholder.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, product_id: &str) -> AppResult<ProductSummary> {
        if product_id.trim().is_empty() {
            return Err(AppError::InvalidInput("productId is required".into()));
        }
        Ok(self.feed.product(product_id).await.value)
    }

    pub fn hero_content(&self) -> Vec<HeroCard> {
        vec![
            hero(
                "Summer Sale",
                "Up to 50% off on selected items",
                "Shop Now",
                "/products?sale=true",
                "https://via.placeholder.com/1200x400?text=Summer+Sale",
            ),
            hero(
                "New Arrivals",
                "Discover the latest trends",
                "Explore",
                "/products?category=new",
                "https://via.placeholder.com/1200x400?text=New+Arrivals",
            ),
            hero(
                "Join Shopster+",
                "Free shipping and member-only deals. Try it free for 7 days",
                "Start Free Trial",
                "/membership",
                "https://via.placeholder.com/1200x400?text=Shopster%2B",
            ),
        ]
    }

    pub fn footer_banners(&self) -> Vec<FooterBanner> {
        vec![
            banner(
                "Free Shipping",
                "On orders over $50, or always with Shopster+",
                "/shipping",
            ),
            banner("Easy Returns", "30-day hassle-free returns", "/returns"),
            banner("Secure Checkout", "Your payment information is protected", "/security"),
        ]
    }
}

fn hero(title: &str, subtitle: &str, cta_text: &str, cta_link: &str, image_url: &str) -> HeroCard {
    HeroCard {
        title: title.to_string(),
        subtitle: subtitle.to_string(),
        cta_text: cta_text.to_string(),
        cta_link: cta_link.to_string(),
        image_url: image_url.to_string(),
    }
}

fn banner(title: &str, description: &str, link: &str) -> FooterBanner {
    FooterBanner {
        title: title.to_string(),
        description: description.to_string(),
        link: link.to_string(),
    }
}
