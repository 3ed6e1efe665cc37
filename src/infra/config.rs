use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::infra::{
    error::InfraError,
    resilience::{CircuitBreakerConfig, ResilienceConfig, RetryConfig},
};

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub redis_url: String,
    pub database_url: String,
    /// Base URL the homepage aggregator uses to reach the product service.
    pub product_service_url: Url,
    /// Artificial latency of the stub payment processor.
    pub payment_delay: StdDuration,
    pub session_sweep_seconds: u64,
    /// Insert the default Shopster+ plans when the plan table is empty.
    pub seed_plans: bool,
    pub product_service: ResilienceConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 3_600);
        let refresh_token_ttl_days: i64 = get_env_default("REFRESH_TOKEN_TTL_DAYS", 7);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 8080)),
        );
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let database_url: String = get_env("DATABASE_URL");

        // The product service is served by this binary unless pointed elsewhere.
        let product_service_url: Url = match std::env::var("PRODUCT_SERVICE_URL") {
            Ok(raw) => Url::parse(&raw)
                .map_err(|_| InfraError::ConfigInvalid { var: "PRODUCT_SERVICE_URL" })?,
            Err(_) => Url::parse(&format!("http://{bind_addr}"))
                .map_err(|_| InfraError::ConfigInvalid { var: "BIND_ADDR" })?,
        };

        let payment_delay_ms: u64 = get_env_default("PAYMENT_DELAY_MS", 500);
        let session_sweep_seconds: u64 = get_env_default("SESSION_SWEEP_SECONDS", 3_600);
        let seed_plans: bool = get_env_default("SEED_PLANS", true);

        let product_service = ResilienceConfig {
            timeout: StdDuration::from_millis(get_env_default("PRODUCT_SERVICE_TIMEOUT_MS", 5_000)),
            retry: RetryConfig::default()
                .with_max_attempts(get_env_default("PRODUCT_SERVICE_RETRY_ATTEMPTS", 3))
                .with_base_delay(StdDuration::from_millis(get_env_default(
                    "PRODUCT_SERVICE_RETRY_DELAY_MS",
                    200,
                ))),
            circuit: CircuitBreakerConfig::default()
                .failure_rate_threshold(get_env_default("PRODUCT_SERVICE_FAILURE_RATE", 0.5))
                .open_duration(StdDuration::from_secs(get_env_default(
                    "PRODUCT_SERVICE_OPEN_SECS",
                    30,
                ))),
            cache_ttl: StdDuration::from_secs(get_env_default("PRODUCT_CACHE_TTL_SECS", 300)),
            cache_capacity: get_env_default("PRODUCT_CACHE_CAPACITY", 1_000),
        };

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            refresh_token_ttl: Duration::days(refresh_token_ttl_days),
            cors_origin,
            bind_addr,
            redis_url,
            database_url,
            product_service_url,
            payment_delay: StdDuration::from_millis(payment_delay_ms),
            session_sweep_seconds,
            seed_plans,
            product_service,
        })
    }
}
