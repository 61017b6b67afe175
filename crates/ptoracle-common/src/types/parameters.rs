//! Discount parameters and the limits governing their changes

use serde::{Deserialize, Serialize};

use crate::types::fixed::Fixed;
use crate::DEFAULT_MIN_UPDATE_INTERVAL;

/// Linear discount model coefficients
///
/// `discount(t) = slope * t_years + intercept`, both scaled by `SCALE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DiscountParameters {
    /// Discount per year of remaining time
    pub slope: Fixed,
    /// Constant floor discount
    pub intercept: Fixed,
}

impl DiscountParameters {
    pub fn new(slope: Fixed, intercept: Fixed) -> Self {
        Self { slope, intercept }
    }
}

/// Limits on how parameters may change
///
/// A delta limit of `None` disables that check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLimits {
    /// An update is accepted only strictly after `last_update + min_update_interval`
    pub min_update_interval: u64,
    /// Largest accepted `|new_slope - slope|`
    pub max_slope_delta: Option<Fixed>,
    /// Largest accepted `|new_intercept - intercept|`
    pub max_intercept_delta: Option<Fixed>,
}

impl UpdateLimits {
    pub fn new(
        min_update_interval: u64,
        max_slope_delta: Option<Fixed>,
        max_intercept_delta: Option<Fixed>,
    ) -> Self {
        Self {
            min_update_interval,
            max_slope_delta,
            max_intercept_delta,
        }
    }

    /// Limits with the given interval and no delta bounds
    pub fn unbounded(min_update_interval: u64) -> Self {
        Self::new(min_update_interval, None, None)
    }
}

impl Default for UpdateLimits {
    fn default() -> Self {
        Self::unbounded(DEFAULT_MIN_UPDATE_INTERVAL)
    }
}

/// Horizon at which proposed parameters are checked for safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyBound {
    /// Check at the current time-to-maturity. With `slope >= 0` the discount
    /// only shrinks from here on, so this covers the rest of the instrument's life.
    #[default]
    RemainingLifetime,
    /// Check at the full term, from engine construction to maturity
    FullTerm,
}
