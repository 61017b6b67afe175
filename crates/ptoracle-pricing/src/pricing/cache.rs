//! Price cache
//!
//! Holds the last computed price and the second it was computed in. There is
//! no dirty flag: a cached price is fresh exactly when its timestamp equals
//! the current second, and goes stale on its own when the clock moves on.

use ptoracle_common::Fixed;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Last computed price and its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceCache {
    price: Fixed,
    updated_at: Option<u64>,
}

impl PriceCache {
    /// An empty cache; stale at every timestamp
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored price (0 before the first store)
    pub fn price(&self) -> Fixed {
        self.price
    }

    pub fn updated_at(&self) -> Option<u64> {
        self.updated_at
    }

    pub fn is_fresh(&self, now: u64) -> bool {
        self.updated_at == Some(now)
    }

    /// Cached price if it was computed in the current second
    pub fn fresh_price(&self, now: u64) -> Option<Fixed> {
        if self.is_fresh(now) {
            debug!(now, price = self.price, "Cache hit");
            Some(self.price)
        } else {
            None
        }
    }

    /// Store a price computed at `now`
    ///
    /// Returns `false`, leaving the cache untouched, if `now` is earlier than
    /// the stored timestamp.
    pub fn store(&mut self, price: Fixed, now: u64) -> bool {
        if let Some(prev) = self.updated_at {
            if now < prev {
                warn!(now, prev, "Clock behind cache timestamp, not caching");
                return false;
            }
        }
        self.price = price;
        self.updated_at = Some(now);
        debug!(now, price, "Cached price");
        true
    }
}
