pub mod auth;
pub mod cart;
pub mod homepage;
pub mod membership;
pub mod products;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/membership", membership::router())
        .nest("/v1/homepage", homepage::router())
        .nest("/v1/products", products::router())
        .nest("/v1/cart", cart::router())
        .nest("/v1/auth", auth::router())
}
