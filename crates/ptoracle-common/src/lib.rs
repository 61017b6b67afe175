//! # PT Oracle Common
//!
//! Shared types, errors, and collaborator interfaces for the principal-token
//! pricing oracle.
//!
//! ## Core Types
//!
//! - [`Fixed`]: unsigned fixed-point integer, `SCALE` = 1e18 = 100%
//! - [`DiscountParameters`]: the linear discount model's slope and intercept
//! - [`UpdateLimits`]: rate and magnitude limits on parameter changes
//!
//! ## Sources
//!
//! - [`sources::feed`]: underlying price feed
//! - [`sources::maturity`]: instrument expiry
//! - [`sources::clock`]: wall clock in unix seconds
//!
//! ## Security
//!
//! - [`security::access`]: capability checks and an in-process role registry
//! - [`security::audit`]: observation records and audit sinks

pub mod error;
pub mod security;
pub mod sources;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{FeedError, OracleError, ParameterField, Result};
pub use security::{
    access::{AccessGateway, Capability, Principal, RoleRegistry},
    audit::{AuditLogger, AuditRecord, AuditSink, MemoryAuditSink, Observation, TracingAuditSink},
};
pub use sources::{
    clock::{Clock, ManualClock, SystemClock},
    feed::{PriceFeed, StaticPriceFeed},
    maturity::{FixedMaturity, MaturitySource},
};
pub use types::{
    fixed::{mul_div_scale, Fixed, SCALE, SECONDS_PER_YEAR},
    parameters::{DiscountParameters, SafetyBound, UpdateLimits},
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound accepted for a target annual yield (1000%)
pub const MAX_TARGET_YIELD: Fixed = 10 * SCALE;

/// Default minimum spacing between parameter updates (24 hours)
pub const DEFAULT_MIN_UPDATE_INTERVAL: u64 = 86_400;
