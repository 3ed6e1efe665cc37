use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::inventory::{InventoryChange, InventoryOp, InventoryRecord},
};

#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn get(&self, product_id: Uuid) -> AppResult<Option<InventoryRecord>>;

    /// Applies `op` to the stored record as a single writer: the record is
    /// locked, mutated through [`InventoryRecord::apply`] and written back
    /// before anyone else can read it for update. `None` if no record exists.
    async fn apply(&self, product_id: Uuid, op: InventoryOp) -> AppResult<Option<InventoryChange>>;
}

#[derive(Clone)]
pub struct InventoryUseCases {
    repo: Arc<dyn InventoryRepo>,
}

impl InventoryUseCases {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> AppResult<InventoryRecord> {
        self.repo.get(product_id).await?.ok_or(AppError::NotFound)
    }

    pub async fn reserve(&self, product_id: Uuid, amount: i32) -> AppResult<InventoryChange> {
        self.apply(product_id, InventoryOp::Reserve(amount)).await
    }

    pub async fn release(&self, product_id: Uuid, amount: i32) -> AppResult<InventoryChange> {
        self.apply(product_id, InventoryOp::Release(amount)).await
    }

    pub async fn consume(&self, product_id: Uuid, amount: i32) -> AppResult<InventoryChange> {
        self.apply(product_id, InventoryOp::Consume(amount)).await
    }

    #[instrument(skip(self, op), fields(op = op.name(), amount = op.amount()))]
    async fn apply(&self, product_id: Uuid, op: InventoryOp) -> AppResult<InventoryChange> {
        let change = self
            .repo
            .apply(product_id, op)
            .await?
            .ok_or(AppError::NotFound)?;

        if change.applied {
            tracing::debug!(
                available = change.record.available_quantity(),
                status = %change.record.stock_status(),
                "Inventory updated"
            );
        } else {
            tracing::info!(
                available = change.record.available_quantity(),
                reserved = change.record.reserved_quantity,
                "Inventory operation ignored"
            );
        }
        Ok(change)
    }
}
