//! Linear discount model
//!
//! Maps `(slope, intercept, time-to-maturity)` to a discount fraction scaled
//! by `SCALE`. The model never clamps: callers decide whether a discount at or
//! above 100% means "reject this proposal" (governance) or "fail loudly"
//! (live pricing).

use ptoracle_common::{
    mul_div_scale, DiscountParameters, Fixed, OracleError, ParameterField, Result, MAX_TARGET_YIELD,
    SCALE, SECONDS_PER_YEAR,
};

/// Pure discount function over a fixed year length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountModel {
    seconds_per_year: u64,
}

impl DiscountModel {
    pub fn new(seconds_per_year: u64) -> Self {
        Self {
            seconds_per_year: seconds_per_year.max(1),
        }
    }

    pub fn seconds_per_year(&self) -> u64 {
        self.seconds_per_year
    }

    /// Time-to-maturity as a fixed-point year fraction (floored)
    pub fn year_fraction(&self, time_to_maturity: u64) -> Fixed {
        // u64::MAX * 1e18 < u128::MAX
        time_to_maturity as Fixed * SCALE / self.seconds_per_year as Fixed
    }

    /// `slope * years + intercept`, unclamped
    pub fn discount(&self, params: DiscountParameters, time_to_maturity: u64) -> Result<Fixed> {
        let years = self.year_fraction(time_to_maturity);
        mul_div_scale(params.slope, years)?
            .checked_add(params.intercept)
            .ok_or(OracleError::Overflow)
    }

    /// Apply a discount to an underlying price
    ///
    /// A discount at or above 100% is an invariant violation, never a zero price.
    pub fn apply(&self, underlying: Fixed, discount: Fixed) -> Result<Fixed> {
        if discount >= SCALE {
            return Err(OracleError::InvariantViolation { discount });
        }
        mul_div_scale(underlying, SCALE - discount)
    }

    /// Discounted price of `underlying` with `time_to_maturity` seconds left
    pub fn price(
        &self,
        params: DiscountParameters,
        underlying: Fixed,
        time_to_maturity: u64,
    ) -> Result<Fixed> {
        let discount = self.discount(params, time_to_maturity)?;
        self.apply(underlying, discount)
    }

    /// Slope that reproduces an annual yield: `y / (1 + y)`
    ///
    /// The yield must be positive and at most 1000%.
    pub fn slope_from_target_yield(expected_annual_yield: Fixed) -> Result<Fixed> {
        if expected_annual_yield == 0 || expected_annual_yield > MAX_TARGET_YIELD {
            return Err(OracleError::OutOfRange {
                field: ParameterField::TargetYield,
                value: expected_annual_yield,
                max: MAX_TARGET_YIELD,
            });
        }
        // y <= 1e19, so y * SCALE <= 1e37
        Ok(expected_annual_yield * SCALE / (SCALE + expected_annual_yield))
    }
}

impl Default for DiscountModel {
    fn default() -> Self {
        Self::new(SECONDS_PER_YEAR)
    }
}

/// Discount for raw coefficients over a given year length
pub fn discount(
    slope: Fixed,
    intercept: Fixed,
    time_to_maturity: u64,
    seconds_per_year: u64,
) -> Result<Fixed> {
    DiscountModel::new(seconds_per_year)
        .discount(DiscountParameters::new(slope, intercept), time_to_maturity)
}
