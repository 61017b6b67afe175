//! Instrument maturity source

use crate::error::FeedError;

/// Source of the instrument's fixed expiry timestamp (unix seconds)
///
/// Read exactly once, when the engine is constructed.
pub trait MaturitySource {
    fn maturity_timestamp(&self) -> Result<u64, FeedError>;
}

/// A maturity known up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMaturity(pub u64);

impl MaturitySource for FixedMaturity {
    fn maturity_timestamp(&self) -> Result<u64, FeedError> {
        Ok(self.0)
    }
}
