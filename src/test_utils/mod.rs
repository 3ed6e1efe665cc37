//! Test utilities shared by the unit and route tests.
//!
//! This module provides:
//! - Test data factories for creating valid fixtures
//! - In-memory implementations of the repository and port traits
//! - `TestAppStateBuilder` for exercising routers without Postgres or Redis

mod app_state_builder;
mod auth_mocks;
mod catalog_mocks;
mod factories;
mod membership_mocks;

pub use app_state_builder::*;
pub use auth_mocks::*;
pub use catalog_mocks::*;
pub use factories::*;
pub use membership_mocks::*;
