use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::cart::Cart,
    infra::error::InfraError,
    use_cases::cart::CartStore,
};

/// Abandoned carts expire after 30 days without changes.
const CART_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Compare-and-set on the stored cart's `version`. Runs atomically on the
/// server, so it is safe on the shared multiplexed connection.
const SAVE_IF_VERSION: &str = r#"
local stored = redis.call('GET', KEYS[1])
local version = 0
if stored then
    version = tonumber(cjson.decode(stored)['version']) or 0
end
if version ~= tonumber(ARGV[1]) then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
return 1
"#;

pub struct RedisCartStore {
    manager: ConnectionManager,
    save_script: Script,
}

impl RedisCartStore {
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;

        Ok(Self {
            manager,
            save_script: Script::new(SAVE_IF_VERSION),
        })
    }

    fn key(user_id: Uuid) -> String {
        format!("cart:{user_id}")
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    async fn load(&self, user_id: Uuid) -> AppResult<Option<Cart>> {
        let mut conn = self.manager.clone();

        let raw: Option<String> = conn
            .get(Self::key(user_id))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                tracing::warn!(user_id = %user_id, error = %e, "Stored cart is unreadable");
                AppError::Internal(e.to_string())
            })
        })
        .transpose()
    }

    async fn save(&self, cart: &Cart, expected_version: u64) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let json = serde_json::to_string(cart).map_err(|e| AppError::Internal(e.to_string()))?;

        let stored: i32 = self
            .save_script
            .key(Self::key(cart.user_id))
            .arg(expected_version)
            .arg(json)
            .arg(CART_TTL_SECS)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(stored == 1)
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        let mut conn = self.manager.clone();

        let _: () = conn
            .del(Self::key(user_id))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }
}
