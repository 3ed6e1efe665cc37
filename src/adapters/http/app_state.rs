use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        auth::AuthUseCases, cart::CartUseCases, homepage::HomepageUseCases,
        inventory::InventoryUseCases, membership::MembershipUseCases,
        membership_plans::MembershipCatalogUseCases, products::ProductUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub membership_catalog_use_cases: Arc<MembershipCatalogUseCases>,
    pub membership_use_cases: Arc<MembershipUseCases>,
    pub inventory_use_cases: Arc<InventoryUseCases>,
    pub product_use_cases: Arc<ProductUseCases>,
    pub homepage_use_cases: Arc<HomepageUseCases>,
    pub cart_use_cases: Arc<CartUseCases>,
    pub auth_use_cases: Arc<AuthUseCases>,
}

impl FromRef<AppState> for Arc<AuthUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_use_cases.clone()
    }
}
