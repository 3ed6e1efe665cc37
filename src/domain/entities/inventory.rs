use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    Backorder,
}

/// A single mutation against an inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "amount", rename_all = "snake_case")]
pub enum InventoryOp {
    /// Hold units for a pending order.
    Reserve(i32),
    /// Return held units to the available pool.
    Release(i32),
    /// Ship units: removes them from stock and from the reservation.
    Consume(i32),
}

impl InventoryOp {
    pub fn name(&self) -> &'static str {
        match self {
            InventoryOp::Reserve(_) => "reserve",
            InventoryOp::Release(_) => "release",
            InventoryOp::Consume(_) => "consume",
        }
    }

    pub fn amount(&self) -> i32 {
        match *self {
            InventoryOp::Reserve(n) | InventoryOp::Release(n) | InventoryOp::Consume(n) => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub low_stock_threshold: i32,
    pub in_stock: bool,
    pub track_quantity: bool,
    pub allow_backorders: bool,
}

impl InventoryRecord {
    pub fn new(product_id: Uuid) -> Self {
        Self {
            product_id,
            quantity: 0,
            reserved_quantity: 0,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            in_stock: false,
            track_quantity: true,
            allow_backorders: false,
        }
    }

    pub fn available_quantity(&self) -> i32 {
        (self.quantity - self.reserved_quantity).max(0)
    }

    pub fn is_out_of_stock(&self) -> bool {
        !self.in_stock || self.available_quantity() <= 0
    }

    pub fn is_low_stock(&self) -> bool {
        let available = self.available_quantity();
        self.in_stock && available > 0 && available <= self.low_stock_threshold
    }

    pub fn stock_status(&self) -> StockStatus {
        if self.is_out_of_stock() {
            if self.allow_backorders {
                StockStatus::Backorder
            } else {
                StockStatus::OutOfStock
            }
        } else if self.available_quantity() <= self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Applies `op` in place. Returns `false` (and leaves the record
    /// untouched) when the amount is non-positive or exceeds what the
    /// operation may draw from.
    pub fn apply(&mut self, op: InventoryOp) -> bool {
        match op {
            InventoryOp::Reserve(n) => {
                if n <= 0 || n > self.available_quantity() {
                    return false;
                }
                self.reserved_quantity += n;
            }
            InventoryOp::Release(n) => {
                if n <= 0 || n > self.reserved_quantity {
                    return false;
                }
                self.reserved_quantity -= n;
            }
            InventoryOp::Consume(n) => {
                if n <= 0 || n > self.quantity {
                    return false;
                }
                self.quantity -= n;
                self.reserved_quantity = (self.reserved_quantity - n).max(0);
            }
        }
        true
    }
}

/// Outcome of applying an [`InventoryOp`] to a stored record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryChange {
    pub applied: bool,
    pub record: InventoryRecord,
}
