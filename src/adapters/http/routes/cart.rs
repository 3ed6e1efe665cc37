use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{api_response::ApiResponse, app_state::AppState},
    app_error::{AppError, AppResult},
    domain::entities::cart::{Cart, CartItem},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_cart).delete(clear_cart))
        .route("/{user_id}/items", post(add_item))
        .route(
            "/{user_id}/items/{product_id}",
            put(update_item).delete(remove_item),
        )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemPayload {
    product_id: String,
    product_name: String,
    quantity: u32,
    price_cents: i64,
    image_url: Option<String>,
    brand: Option<String>,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl From<AddItemPayload> for CartItem {
    fn from(p: AddItemPayload) -> Self {
        CartItem {
            product_id: p.product_id.trim().to_string(),
            product_name: p.product_name,
            quantity: p.quantity,
            price_cents: p.price_cents,
            image_url: p.image_url,
            brand: p.brand,
            in_stock: p.in_stock,
        }
    }
}

#[derive(Deserialize)]
struct UpdateItemPayload {
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartView {
    #[serde(flatten)]
    cart: Cart,
    total_items: u32,
    total_cents: i64,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        Self {
            total_items: cart.total_items(),
            total_cents: cart.total_cents(),
            cart,
        }
    }
}

async fn get_cart(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<impl IntoResponse> {
    let cart = app_state.cart_use_cases.get_cart(user_id).await?;
    Ok(ApiResponse::ok(CartView::from(cart), "Cart retrieved"))
}

async fn add_item(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AddItemPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let cart = app_state
        .cart_use_cases
        .add_item(user_id, payload.into())
        .await?;
    Ok(ApiResponse::ok(CartView::from(cart), "Item added to cart"))
}

async fn update_item(
    State(app_state): State<AppState>,
    WithRejection(Path((user_id, product_id)), _): WithRejection<Path<(Uuid, String)>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateItemPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let cart = app_state
        .cart_use_cases
        .update_item(user_id, &product_id, payload.quantity)
        .await?;
    Ok(ApiResponse::ok(CartView::from(cart), "Cart item updated"))
}

async fn remove_item(
    State(app_state): State<AppState>,
    WithRejection(Path((user_id, product_id)), _): WithRejection<Path<(Uuid, String)>, AppError>,
) -> AppResult<impl IntoResponse> {
    let cart = app_state
        .cart_use_cases
        .remove_item(user_id, &product_id)
        .await?;
    Ok(ApiResponse::ok(CartView::from(cart), "Cart item removed"))
}

async fn clear_cart(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<impl IntoResponse> {
    app_state.cart_use_cases.clear_cart(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
