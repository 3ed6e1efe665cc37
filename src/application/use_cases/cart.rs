use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::cart::{Cart, CartItem},
};

pub const MAX_ITEM_QUANTITY: u32 = 99;
/// Highest accepted unit price: $1,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
/// Load-modify-save rounds before a contended cart write gives up.
const MAX_SAVE_ATTEMPTS: u32 = 5;

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> AppResult<Option<Cart>>;
    /// Stores `cart` only if the stored version still equals
    /// `expected_version` (0 when nothing is stored). Returns `false` when
    /// another writer got there first.
    async fn save(&self, cart: &Cart, expected_version: u64) -> AppResult<bool>;
    async fn delete(&self, user_id: Uuid) -> AppResult<()>;
}

#[derive(Clone)]
pub struct CartUseCases {
    store: Arc<dyn CartStore>,
}

impl CartUseCases {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// The user's cart, or an empty one if nothing is stored yet.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> AppResult<Cart> {
        Ok(self
            .store
            .load(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add_item(&self, user_id: Uuid, item: CartItem) -> AppResult<Cart> {
        if item.product_id.trim().is_empty() {
            return Err(AppError::InvalidInput("productId is required".into()));
        }
        validate_quantity(item.quantity)?;
        if !(0..=MAX_PRICE_CENTS).contains(&item.price_cents) {
            return Err(AppError::InvalidInput(format!(
                "priceCents must be between 0 and {MAX_PRICE_CENTS}"
            )));
        }

        self.modify(user_id, |cart| {
            let merged = cart.quantity_of(&item.product_id).saturating_add(item.quantity);
            if merged > MAX_ITEM_QUANTITY {
                return Err(AppError::InvalidInput(format!(
                    "quantity must be between 1 and {MAX_ITEM_QUANTITY}"
                )));
            }
            cart.add_item(item.clone());
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: Uuid,
        product_id: &str,
        quantity: u32,
    ) -> AppResult<Cart> {
        validate_quantity(quantity)?;
        self.modify(user_id, |cart| {
            if cart.update_quantity(product_id, quantity) {
                Ok(())
            } else {
                Err(AppError::NotFound)
            }
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, product_id: &str) -> AppResult<Cart> {
        self.modify(user_id, |cart| {
            if cart.remove_item(product_id) {
                Ok(())
            } else {
                Err(AppError::NotFound)
            }
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> AppResult<()> {
        self.store.delete(user_id).await
    }

    /// Applies `change` to the freshest stored cart and saves it, starting
    /// over when a concurrent writer bumped the version in between.
    async fn modify<F>(&self, user_id: Uuid, mut change: F) -> AppResult<Cart>
    where
        F: FnMut(&mut Cart) -> AppResult<()> + Send,
    {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let mut cart = self.get_cart(user_id).await?;
            let expected_version = cart.version;
            change(&mut cart)?;
            cart.version = expected_version + 1;

            if self.store.save(&cart, expected_version).await? {
                return Ok(cart);
            }
            tracing::debug!(user_id = %user_id, attempt, "Cart changed concurrently, retrying");
        }

        tracing::warn!(user_id = %user_id, "Cart write kept losing to concurrent writers");
        Err(AppError::Conflict(
            "Cart was modified concurrently, please retry".into(),
        ))
    }
}

fn validate_quantity(quantity: u32) -> AppResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
        return Err(AppError::InvalidInput(format!(
            "quantity must be between 1 and {MAX_ITEM_QUANTITY}"
        )));
    }
    Ok(())
}
