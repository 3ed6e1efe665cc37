use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    adapters::http::{api_response::ApiResponse, app_state::AppState},
    app_error::{AppError, AppResult},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/hero-content", get(hero_content))
        .route("/product-carousel/{carousel_type}", get(product_carousel))
        .route("/products/{product_id}", get(product_detail))
        .route("/footer-banners", get(footer_banners))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<u32>,
}

async fn hero_content(State(app_state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(app_state.homepage_use_cases.hero_content(), "Success")
}

/// GET /api/v1/homepage/product-carousel/{type}?limit=N
///
/// Always 200 for a valid type; the product service being down only
/// changes where the products come from.
async fn product_carousel(
    State(app_state): State<AppState>,
    WithRejection(Path(carousel_type), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<LimitQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    let carousel = app_state
        .homepage_use_cases
        .product_carousel(&carousel_type, query.limit)
        .await?;

    Ok(ApiResponse::ok(carousel, "Success"))
}

async fn product_detail(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<impl IntoResponse> {
    let product = app_state
        .homepage_use_cases
        .product_detail(&product_id)
        .await?;

    Ok(ApiResponse::ok(product, "Success"))
}

async fn footer_banners(State(app_state): State<AppState>) -> impl IntoResponse {
    ApiResponse::ok(app_state.homepage_use_cases.footer_banners(), "Success")
}
