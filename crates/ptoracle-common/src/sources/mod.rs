//! External read-only sources consulted by the pricing engine
//!
//! - Underlying price feed
//! - Instrument maturity
//! - Wall clock

pub mod clock;
pub mod feed;
pub mod maturity;
