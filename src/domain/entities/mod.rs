pub mod account_status;
pub mod cart;
pub mod inventory;
pub mod membership_plan;
pub mod membership_subscription;
pub mod product;
