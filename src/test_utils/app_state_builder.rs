//! Test app state builder for route tests.
//!
//! `TestAppStateBuilder` wires every use case to in-memory mocks so a router
//! can be driven through `axum_test::TestServer`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::{payment_gateway::PaymentGateway, product_catalog::ProductFeed},
        use_cases::{
            auth::AuthUseCases, cart::CartUseCases, homepage::HomepageUseCases,
            inventory::InventoryUseCases, membership::MembershipUseCases,
            membership::MembershipSubscriptionProfile,
            membership_plans::{MembershipCatalogUseCases, MembershipPlanProfile},
            products::{ProductRepo, ProductUseCases},
        },
    },
    domain::entities::inventory::InventoryRecord,
    infra::{config::AppConfig, resilience::ResilienceConfig},
    test_utils::{
        InMemoryCartStore, InMemoryInventoryRepo, InMemoryMembershipPlanRepo,
        InMemoryMembershipSubscriptionRepo, InMemoryProductRepo, InMemorySessionRepo,
        InMemoryUserRepo, MockPaymentGateway, StaticProductFeed,
    },
};

pub const TEST_JWT_SECRET: &str = "test_jwt_secret";

pub fn test_config() -> AppConfig {
    let bind_addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        access_token_ttl: Duration::hours(1),
        refresh_token_ttl: Duration::days(7),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        database_url: "postgres://localhost/shopster_test".to_string(),
        product_service_url: Url::parse(&format!("http://{bind_addr}")).unwrap(),
        payment_delay: StdDuration::ZERO,
        session_sweep_seconds: 3_600,
        seed_plans: false,
        product_service: ResilienceConfig::default(),
    }
}

#[derive(Default)]
pub struct TestAppStateBuilder {
    plans: Vec<MembershipPlanProfile>,
    subscriptions: Vec<MembershipSubscriptionProfile>,
    inventory: Vec<InventoryRecord>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    product_repo: Option<Arc<dyn ProductRepo>>,
    product_feed: Option<Arc<dyn ProductFeed>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(mut self, plans: Vec<MembershipPlanProfile>) -> Self {
        self.plans.extend(plans);
        self
    }

    pub fn with_subscriptions(
        mut self,
        subscriptions: Vec<MembershipSubscriptionProfile>,
    ) -> Self {
        self.subscriptions.extend(subscriptions);
        self
    }

    pub fn with_inventory(mut self, records: Vec<InventoryRecord>) -> Self {
        self.inventory.extend(records);
        self
    }

    /// Replaces the approving mock gateway.
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = Some(gateway);
        self
    }

    pub fn with_product_repo(mut self, repo: Arc<dyn ProductRepo>) -> Self {
        self.product_repo = Some(repo);
        self
    }

    /// Feed behind the homepage carousels. Defaults to an empty live feed.
    pub fn with_product_feed(mut self, feed: Arc<dyn ProductFeed>) -> Self {
        self.product_feed = Some(feed);
        self
    }

    pub fn build(self) -> AppState {
        let config = test_config();

        let plans = Arc::new(InMemoryMembershipPlanRepo::with_plans(self.plans));
        let subscriptions = Arc::new(InMemoryMembershipSubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let payments: Arc<dyn PaymentGateway> = match self.payment_gateway {
            Some(gateway) => gateway,
            None => Arc::new(MockPaymentGateway::approving()),
        };
        let product_repo: Arc<dyn ProductRepo> = match self.product_repo {
            Some(repo) => repo,
            None => Arc::new(InMemoryProductRepo::new()),
        };
        let product_feed: Arc<dyn ProductFeed> = match self.product_feed {
            Some(feed) => feed,
            None => Arc::new(StaticProductFeed::live(0)),
        };

        let auth_use_cases = AuthUseCases::new(
            Arc::new(InMemoryUserRepo::new()),
            Arc::new(InMemorySessionRepo::new()),
            config.jwt_secret.clone(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        );

        AppState {
            membership_catalog_use_cases: Arc::new(MembershipCatalogUseCases::new(
                plans.clone(),
            )),
            membership_use_cases: Arc::new(MembershipUseCases::new(
                plans,
                subscriptions,
                payments,
            )),
            inventory_use_cases: Arc::new(InventoryUseCases::new(Arc::new(
                InMemoryInventoryRepo::with_records(self.inventory),
            ))),
            product_use_cases: Arc::new(ProductUseCases::new(product_repo)),
            homepage_use_cases: Arc::new(HomepageUseCases::new(product_feed)),
            cart_use_cases: Arc::new(CartUseCases::new(Arc::new(InMemoryCartStore::new()))),
            auth_use_cases: Arc::new(auth_use_cases),
            config: Arc::new(config),
        }
    }
}
