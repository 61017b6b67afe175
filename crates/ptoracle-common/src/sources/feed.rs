//! Underlying price feed

use parking_lot::RwLock;
use tracing::debug;

use crate::error::FeedError;
use crate::types::fixed::Fixed;

/// Synchronous source of the reference asset's current price
pub trait PriceFeed: Send + Sync {
    /// Current underlying price in the feed's own integer scale
    fn current_price(&self) -> Result<Fixed, FeedError>;
}

/// In-process feed holding a settable price
///
/// Used by the keeper binary and tests. Can be taken offline to simulate an
/// upstream outage.
pub struct StaticPriceFeed {
    price: RwLock<Option<Fixed>>,
}

impl StaticPriceFeed {
    pub fn new(price: Fixed) -> Self {
        Self {
            price: RwLock::new(Some(price)),
        }
    }

    /// A feed that fails every read
    pub fn offline() -> Self {
        Self {
            price: RwLock::new(None),
        }
    }

    pub fn set_price(&self, price: Fixed) {
        debug!(price, "Static feed price set");
        *self.price.write() = Some(price);
    }

    pub fn set_offline(&self) {
        *self.price.write() = None;
    }
}

impl PriceFeed for StaticPriceFeed {
    fn current_price(&self) -> Result<Fixed, FeedError> {
        (*self.price.read())
            .ok_or_else(|| FeedError::Offline("static feed has no price".to_string()))
    }
}
