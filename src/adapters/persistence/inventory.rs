use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::inventory::InventoryRepo,
    domain::entities::inventory::{InventoryChange, InventoryOp, InventoryRecord},
};

fn row_to_record(row: sqlx::postgres::PgRow) -> InventoryRecord {
    InventoryRecord {
        product_id: row.get("product_id"),
        quantity: row.get("quantity"),
        reserved_quantity: row.get("reserved_quantity"),
        low_stock_threshold: row.get("low_stock_threshold"),
        in_stock: row.get("in_stock"),
        track_quantity: row.get("track_quantity"),
        allow_backorders: row.get("allow_backorders"),
    }
}

const SELECT_COLS: &str = r#"
    product_id, quantity, reserved_quantity, low_stock_threshold,
    in_stock, track_quantity, allow_backorders
"#;

#[async_trait]
impl InventoryRepo for PostgresPersistence {
    async fn get(&self, product_id: Uuid) -> AppResult<Option<InventoryRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM inventory WHERE product_id = $1",
            SELECT_COLS
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_record))
    }

    async fn apply(&self, product_id: Uuid, op: InventoryOp) -> AppResult<Option<InventoryChange>> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        // Row lock serialises concurrent reservations on the same product.
        let row = sqlx::query(&format!(
            "SELECT {} FROM inventory WHERE product_id = $1 FOR UPDATE",
            SELECT_COLS
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = row_to_record(row);

        if !record.apply(op) {
            tx.rollback().await.map_err(AppError::from)?;
            return Ok(Some(InventoryChange {
                applied: false,
                record,
            }));
        }

        sqlx::query(
            r#"UPDATE inventory
               SET quantity = $2, reserved_quantity = $3, updated_at = NOW()
               WHERE product_id = $1"#,
        )
        .bind(product_id)
        .bind(record.quantity)
        .bind(record.reserved_quantity)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(Some(InventoryChange {
            applied: true,
            record,
        }))
    }
}
