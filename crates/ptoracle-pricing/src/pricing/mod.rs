//! Pricing module
//!
//! Provides principal token pricing with:
//! - A linear, time-parameterized discount
//! - A price cache refreshed at most once per second
//! - Pass-through of the underlying price after maturity

pub mod cache;
pub mod discount;
pub mod engine;

pub use cache::PriceCache;
pub use discount::DiscountModel;
pub use engine::{EngineConfig, PricingEngine};
