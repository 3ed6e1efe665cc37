//! Test data factories.
//!
//! Each factory returns a complete, valid object. Use the closure to
//! override the fields a test cares about.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::{
        membership::MembershipSubscriptionProfile, membership_plans::MembershipPlanProfile,
    },
    domain::entities::{
        cart::CartItem,
        inventory::{DEFAULT_LOW_STOCK_THRESHOLD, InventoryRecord},
        membership_plan::{BillingCycle, PlanType},
        membership_subscription::{PaymentMethodType, SubscriptionStatus},
        product::ProductSummary,
    },
};

/// Active monthly STANDARD plan without a trial.
pub fn create_test_plan(overrides: impl FnOnce(&mut MembershipPlanProfile)) -> MembershipPlanProfile {
    let now = Utc::now();
    let mut plan = MembershipPlanProfile {
        id: Uuid::new_v4(),
        plan_code: "TEST_PLAN".to_string(),
        name: "Test Plan".to_string(),
        description: Some("A plan for tests".to_string()),
        price_cents: 999,
        billing_cycle: BillingCycle::Monthly,
        trial_days: 0,
        plan_type: PlanType::Standard,
        active: true,
        display_order: 0,
        features: vec!["Free shipping on all orders".to_string()],
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut plan);
    plan
}

/// ACTIVE, auto-renewing subscription billed again in 30 days.
pub fn create_test_subscription(
    user_id: Uuid,
    overrides: impl FnOnce(&mut MembershipSubscriptionProfile),
) -> MembershipSubscriptionProfile {
    let now = Utc::now();
    let mut subscription = MembershipSubscriptionProfile {
        id: Uuid::new_v4(),
        user_id,
        plan_id: Uuid::new_v4(),
        plan_code: "TEST_PLAN".to_string(),
        status: SubscriptionStatus::Active,
        trial_start_date: None,
        trial_end_date: None,
        subscription_start_date: Some(now),
        subscription_end_date: None,
        next_billing_date: Some(now + Duration::days(30)),
        last_billing_date: Some(now),
        amount_cents: 999,
        payment_method_id: "pm_test".to_string(),
        payment_method_type: PaymentMethodType::CreditCard,
        auto_renew: true,
        cancellation_date: None,
        cancellation_reason: None,
        version: 0,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut subscription);
    subscription
}

pub fn create_test_inventory(overrides: impl FnOnce(&mut InventoryRecord)) -> InventoryRecord {
    let mut record = InventoryRecord {
        product_id: Uuid::new_v4(),
        quantity: 100,
        reserved_quantity: 0,
        low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        in_stock: true,
        track_quantity: true,
        allow_backorders: false,
    };
    overrides(&mut record);
    record
}

pub fn create_test_product(overrides: impl FnOnce(&mut ProductSummary)) -> ProductSummary {
    let mut product = ProductSummary {
        id: Uuid::new_v4().to_string(),
        name: "Test Product".to_string(),
        brand: Some("Acme".to_string()),
        category: Some("home".to_string()),
        price_cents: 1_999,
        sale_price_cents: None,
        image_url: None,
        rating: Some(4.2),
        review_count: 10,
        in_stock: true,
        badge: None,
        quantity: 100,
    };
    overrides(&mut product);
    product
}

pub fn create_test_cart_item(product_id: &str, overrides: impl FnOnce(&mut CartItem)) -> CartItem {
    let mut item = CartItem {
        product_id: product_id.to_string(),
        product_name: format!("Item {product_id}"),
        quantity: 1,
        price_cents: 1_000,
        image_url: None,
        brand: None,
        in_stock: true,
    };
    overrides(&mut item);
    item
}
