//! Product service routes.
//!
//! Listing and detail reads return bare JSON for the homepage aggregator;
//! inventory routes use the common envelope.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{api_response::ApiResponse, app_state::AppState},
    app_error::{AppError, AppResult},
    domain::entities::{
        inventory::{InventoryChange, InventoryRecord, StockStatus},
        product::{ProductListing, ProductSummary},
    },
    use_cases::products::PageRequest,
};

const DEFAULT_PAGE_SIZE: u32 = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/featured", get(featured))
        .route("/trending", get(trending))
        .route("/recommended", get(recommended))
        .route("/random", get(random))
        .route("/search", get(search))
        .route("/category/{category}", get(by_category))
        .route("/{product_id}", get(get_product))
        .route("/{product_id}/inventory", get(get_inventory))
        .route("/{product_id}/inventory/{op}", post(update_inventory))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_page_size")]
    size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<PageQuery> for PageRequest {
    fn from(q: PageQuery) -> Self {
        PageRequest {
            page: q.page,
            size: q.size,
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    #[serde(default)]
    page: u32,
    #[serde(default = "default_page_size")]
    size: u32,
}

#[derive(Deserialize)]
struct AmountPayload {
    amount: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InventoryView {
    #[serde(flatten)]
    record: InventoryRecord,
    available_quantity: i32,
    stock_status: StockStatus,
}

impl From<InventoryRecord> for InventoryView {
    fn from(record: InventoryRecord) -> Self {
        Self {
            available_quantity: record.available_quantity(),
            stock_status: record.stock_status(),
            record,
        }
    }
}

#[derive(Serialize)]
struct InventoryChangeView {
    applied: bool,
    inventory: InventoryView,
}

impl From<InventoryChange> for InventoryChangeView {
    fn from(change: InventoryChange) -> Self {
        Self {
            applied: change.applied,
            inventory: change.record.into(),
        }
    }
}

async fn list(
    app_state: &AppState,
    listing: ProductListing,
    limit: Option<u32>,
) -> AppResult<Json<Vec<ProductSummary>>> {
    let products = app_state.product_use_cases.listing(listing, limit).await?;
    Ok(Json(products))
}

async fn featured(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    list(&app_state, ProductListing::Featured, query.limit).await
}

async fn trending(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    list(&app_state, ProductListing::Trending, query.limit).await
}

async fn recommended(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    list(&app_state, ProductListing::Recommended, query.limit).await
}

async fn random(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    list(&app_state, ProductListing::Random, query.limit).await
}

async fn search(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<SearchQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    let products = app_state
        .product_use_cases
        .search(
            &query.q,
            PageRequest {
                page: query.page,
                size: query.size,
            },
        )
        .await?;
    Ok(Json(products))
}

async fn by_category(
    State(app_state): State<AppState>,
    WithRejection(Path(category), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    let products = app_state
        .product_use_cases
        .by_category(&category, query.into())
        .await?;
    Ok(Json(products))
}

/// Ids that aren't UUIDs can't exist, so they are a 404 rather than a 400.
fn parse_product_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

async fn get_product(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<impl IntoResponse> {
    let product = app_state
        .product_use_cases
        .get(parse_product_id(&product_id)?)
        .await?;
    Ok(Json(product))
}

async fn get_inventory(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<impl IntoResponse> {
    let record = app_state
        .inventory_use_cases
        .get(parse_product_id(&product_id)?)
        .await?;
    Ok(ApiResponse::ok(InventoryView::from(record), "Inventory retrieved"))
}

async fn update_inventory(
    State(app_state): State<AppState>,
    WithRejection(Path((product_id, op)), _): WithRejection<Path<(String, String)>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AmountPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let product_id = parse_product_id(&product_id)?;
    let inventory = &app_state.inventory_use_cases;

    let change = match op.as_str() {
        "reserve" => inventory.reserve(product_id, payload.amount).await?,
        "release" => inventory.release(product_id, payload.amount).await?,
        "consume" => inventory.consume(product_id, payload.amount).await?,
        _ => {
            return Err(AppError::InvalidInput(
                "Invalid inventory operation. Must be: reserve, release, or consume".into(),
            ));
        }
    };

    let message = if change.applied {
        "Inventory updated"
    } else {
        "Inventory unchanged"
    };
    Ok(ApiResponse::ok(InventoryChangeView::from(change), message))
}
