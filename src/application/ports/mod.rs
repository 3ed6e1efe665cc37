pub mod payment_gateway;
pub mod product_catalog;
