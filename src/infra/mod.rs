use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod cart_store;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod payment_stub;
pub mod product_service_client;
pub mod resilience;
pub mod setup;

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url).await?;
    let persistence = PostgresPersistence::new(pool);
    Ok(persistence)
}
