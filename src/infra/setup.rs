use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::ports::{payment_gateway::PaymentGateway, product_catalog::ProductCatalogClient},
    infra::{
        cart_store::RedisCartStore, config::AppConfig, http_client::build_client,
        payment_stub::PaymentStub, postgres_persistence,
        product_service_client::HttpProductCatalogClient, resilience::catalog::ResilientCatalog,
    },
    use_cases::{
        auth::AuthUseCases, cart::CartUseCases, homepage::HomepageUseCases,
        inventory::InventoryUseCases, membership::MembershipUseCases,
        membership_plans::MembershipCatalogUseCases, products::ProductUseCases,
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let cart_store = Arc::new(RedisCartStore::new(&config.redis_url).await?);

    let catalog_client: Arc<dyn ProductCatalogClient> = Arc::new(HttpProductCatalogClient::new(
        build_client()?,
        config.product_service_url.clone(),
    ));
    let product_feed = Arc::new(ResilientCatalog::new(
        catalog_client,
        config.product_service.clone(),
    ));
    let payments: Arc<dyn PaymentGateway> = Arc::new(PaymentStub::new(config.payment_delay));

    let membership_catalog_use_cases = MembershipCatalogUseCases::new(postgres_arc.clone());
    if config.seed_plans {
        membership_catalog_use_cases.seed_default_plans().await?;
    }

    let auth_use_cases = AuthUseCases::new(
        postgres_arc.clone(),
        postgres_arc.clone(),
        config.jwt_secret.clone(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    );

    Ok(AppState {
        membership_catalog_use_cases: Arc::new(membership_catalog_use_cases),
        membership_use_cases: Arc::new(MembershipUseCases::new(
            postgres_arc.clone(),
            postgres_arc.clone(),
            payments,
        )),
        inventory_use_cases: Arc::new(InventoryUseCases::new(postgres_arc.clone())),
        product_use_cases: Arc::new(ProductUseCases::new(postgres_arc)),
        homepage_use_cases: Arc::new(HomepageUseCases::new(product_feed)),
        cart_use_cases: Arc::new(CartUseCases::new(cart_store)),
        auth_use_cases: Arc::new(auth_use_cases),
        config: Arc::new(config),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopster=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs), skipped when app.log cannot be opened
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(Arc::new(file))
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
