//! Fixed-point arithmetic
//!
//! All fractions (discounts, slopes, intercepts, yields) are unsigned integers
//! scaled by [`SCALE`], so `SCALE` represents 1.0 (100%). Prices keep the
//! scale of the feed that produced them.

use crate::error::{OracleError, Result};

/// Unsigned fixed-point integer
pub type Fixed = u128;

/// 1.0 in fixed-point
pub const SCALE: Fixed = 1_000_000_000_000_000_000;

/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// `floor(a * b / SCALE)` without an intermediate overflow.
///
/// Both operands are split into whole and fractional parts of `SCALE`, so the
/// result is exact whenever it fits in a `u128`. Fails with
/// [`OracleError::Overflow`] otherwise.
pub fn mul_div_scale(a: Fixed, b: Fixed) -> Result<Fixed> {
    let (qa, ra) = (a / SCALE, a % SCALE);
    let (qb, rb) = (b / SCALE, b % SCALE);

    let whole = qa
        .checked_mul(qb)
        .and_then(|v| v.checked_mul(SCALE))
        .ok_or(OracleError::Overflow)?;
    let cross = qa
        .checked_mul(rb)
        .and_then(|v| ra.checked_mul(qb).and_then(|w| v.checked_add(w)))
        .ok_or(OracleError::Overflow)?;
    // ra, rb < SCALE so the product stays below 1e36
    let frac = ra * rb / SCALE;

    whole
        .checked_add(cross)
        .and_then(|v| v.checked_add(frac))
        .ok_or(OracleError::Overflow)
}
