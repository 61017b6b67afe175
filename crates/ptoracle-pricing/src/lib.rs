//! # PT Oracle Pricing
//!
//! Deterministic pricing for principal tokens that converge to their
//! underlying at a fixed maturity.
//!
//! ## Pricing Formula
//!
//! ```text
//! t        = (maturity - now) / seconds_per_year
//! discount = slope * t + intercept
//! price    = underlying * (1 - discount)
//! ```
//!
//! At and after maturity the price is the underlying price.
//!
//! ## Components
//!
//! - [`pricing::discount`]: the pure discount model
//! - [`pricing::cache`]: once-per-second price cache
//! - [`pricing::engine`]: price queries and cache refreshes
//! - [`governance::store`]: validated parameter and limit changes
//! - [`governance::gateway`]: capability checks in front of the store

pub mod governance;
pub mod pricing;

pub use governance::{GovernanceGateway, ParameterStore};
pub use pricing::{
    discount::DiscountModel, EngineConfig, PriceCache, PricingEngine,
};
