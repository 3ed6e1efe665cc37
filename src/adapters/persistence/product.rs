use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::products::{PageRequest, ProductRepo},
    domain::entities::product::{ProductListing, ProductSummary, product_badge},
};

fn row_to_summary(row: sqlx::postgres::PgRow) -> ProductSummary {
    let id: Uuid = row.get("id");
    let price_cents: i64 = row.get("price_cents");
    let sale_price_cents: Option<i64> = row.get("sale_price_cents");

    ProductSummary {
        id: id.to_string(),
        name: row.get("name"),
        brand: row.get("brand"),
        category: row.get("category"),
        price_cents,
        sale_price_cents,
        image_url: row.get("image_url"),
        rating: row.get("rating"),
        review_count: row.get("review_count"),
        in_stock: row.get("in_stock"),
        badge: product_badge(
            row.get("is_featured"),
            row.get("is_trending"),
            price_cents,
            sale_price_cents,
        ),
        quantity: row.get("quantity"),
    }
}

const SELECT_COLS: &str = r#"
    p.id, p.name, p.brand, p.category, p.price_cents, p.sale_price_cents,
    p.image_url, p.rating, p.review_count, p.is_featured, p.is_trending,
    COALESCE(GREATEST(i.quantity - i.reserved_quantity, 0), 0) AS quantity,
    COALESCE(i.in_stock AND i.quantity > i.reserved_quantity, false) AS in_stock
"#;

const FROM_VISIBLE: &str = r#"
    FROM products p
    LEFT JOIN inventory i ON i.product_id = p.id
    WHERE p.is_active = true AND p.is_public = true
"#;

fn listing_clause(listing: ProductListing) -> &'static str {
    match listing {
        ProductListing::Featured => "AND p.is_featured = true ORDER BY p.created_at DESC",
        ProductListing::Trending => {
            "AND p.is_trending = true ORDER BY p.review_count DESC, p.created_at DESC"
        }
        ProductListing::Recommended => {
            "AND p.is_recommended = true ORDER BY p.rating DESC NULLS LAST, p.created_at DESC"
        }
        ProductListing::Random => "ORDER BY RANDOM()",
    }
}

/// `%term%` with LIKE wildcards in the term taken literally.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ProductRepo for PostgresPersistence {
    async fn list(&self, listing: ProductListing, limit: u32) -> AppResult<Vec<ProductSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {} {} {} LIMIT $1",
            SELECT_COLS,
            FROM_VISIBLE,
            listing_clause(listing)
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn get(&self, product_id: Uuid) -> AppResult<Option<ProductSummary>> {
        let row = sqlx::query(&format!(
            "SELECT {} {} AND p.id = $1",
            SELECT_COLS, FROM_VISIBLE
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_summary))
    }

    async fn search(&self, query: &str, page: PageRequest) -> AppResult<Vec<ProductSummary>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} {}
               AND (p.name ILIKE $1 OR p.brand ILIKE $1 OR p.description ILIKE $1)
               ORDER BY p.name
               LIMIT $2 OFFSET $3"#,
            SELECT_COLS, FROM_VISIBLE
        ))
        .bind(contains_pattern(query))
        .bind(i64::from(page.size))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn list_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> AppResult<Vec<ProductSummary>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {} {}
               AND LOWER(p.category) = LOWER($1)
               ORDER BY p.name
               LIMIT $2 OFFSET $3"#,
            SELECT_COLS, FROM_VISIBLE
        ))
        .bind(category)
        .bind(i64::from(page.size))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_summary).collect())
    }
}
