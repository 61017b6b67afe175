//! Error types for the PT oracle
//!
//! Every failure is local to the call that raised it. Validation always runs
//! before commit, so no variant implies corrupted state.

use std::fmt;

use thiserror::Error;

use crate::security::access::Capability;
use crate::types::fixed::Fixed;

/// Result type alias using OracleError
pub type Result<T> = std::result::Result<T, OracleError>;

/// Unified error type for oracle operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    // External reads
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] FeedError),

    // Governance validation
    #[error("{field} out of range: {value} > {max}")]
    OutOfRange {
        field: ParameterField,
        value: Fixed,
        max: Fixed,
    },

    #[error("{field} change exceeds limit: delta {delta} > {limit}")]
    DeltaExceeded {
        field: ParameterField,
        delta: Fixed,
        limit: Fixed,
    },

    #[error("Update interval not elapsed: next update allowed after {not_before}")]
    RateLimited { not_before: u64 },

    // Safety
    #[error("Discount {discount} reaches or exceeds 100%")]
    InvariantViolation { discount: Fixed },

    // Authorization
    #[error("Principal {principal} lacks capability {capability}")]
    Unauthorized {
        principal: String,
        capability: Capability,
    },

    #[error("Fixed-point arithmetic overflow")]
    Overflow,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure reading an external source
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("price feed offline: {0}")]
    Offline(String),

    #[error("price feed returned an invalid price: {0}")]
    InvalidPrice(String),

    #[error("maturity source unreachable: {0}")]
    MaturityUnavailable(String),
}

/// Parameter named in range and delta errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterField {
    Slope,
    Intercept,
    TargetYield,
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterField::Slope => write!(f, "slope"),
            ParameterField::Intercept => write!(f, "intercept"),
            ParameterField::TargetYield => write!(f, "target yield"),
        }
    }
}
