pub mod auth;
pub mod cart;
pub mod homepage;
pub mod inventory;
pub mod membership;
pub mod membership_plans;
pub mod products;
