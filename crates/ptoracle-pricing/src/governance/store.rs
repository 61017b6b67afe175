//! Parameter store
//!
//! Holds the live discount parameters and the limits on changing them. A
//! proposal is checked in full against the pre-commit state and only then
//! committed, so a rejected proposal leaves nothing behind. Checks run in a
//! fixed order and the first failure wins:
//!
//! 1. rate limit
//! 2. absolute range
//! 3. change magnitude
//! 4. safety (discount strictly below 100% over the safety horizon)

use ptoracle_common::{
    DiscountParameters, Fixed, Observation, OracleError, ParameterField, Result, SafetyBound,
    UpdateLimits, SCALE,
};
use tracing::{info, warn};

use crate::pricing::discount::DiscountModel;

/// Live discount parameters plus the rules for changing them
#[derive(Debug, Clone)]
pub struct ParameterStore {
    params: DiscountParameters,
    limits: UpdateLimits,
    last_update: u64,
    maturity: u64,
    issued_at: u64,
    safety_bound: SafetyBound,
    model: DiscountModel,
}

impl ParameterStore {
    /// Create a store, validating the initial parameters' range and safety
    ///
    /// `now` becomes both the issuance time and the last update time, so the
    /// first proposal has to wait out `limits.min_update_interval`.
    pub fn new(
        initial: DiscountParameters,
        limits: UpdateLimits,
        maturity: u64,
        now: u64,
        safety_bound: SafetyBound,
        model: DiscountModel,
    ) -> Result<Self> {
        let store = Self {
            params: initial,
            limits,
            last_update: now,
            maturity,
            issued_at: now,
            safety_bound,
            model,
        };
        store.check_range(initial)?;
        store.check_safety(initial, now)?;
        Ok(store)
    }

    pub fn parameters(&self) -> DiscountParameters {
        self.params
    }

    pub fn limits(&self) -> UpdateLimits {
        self.limits
    }

    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    pub fn maturity(&self) -> u64 {
        self.maturity
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub fn safety_bound(&self) -> SafetyBound {
        self.safety_bound
    }

    pub fn model(&self) -> DiscountModel {
        self.model
    }

    /// Time-to-maturity at which proposals are safety-checked
    pub fn safety_horizon(&self, now: u64) -> u64 {
        match self.safety_bound {
            SafetyBound::RemainingLifetime => self.maturity.saturating_sub(now),
            SafetyBound::FullTerm => self.maturity.saturating_sub(self.issued_at),
        }
    }

    /// Run every check against the current state without committing
    pub fn validate(&self, proposal: DiscountParameters, now: u64) -> Result<()> {
        self.check_rate_limit(now)?;
        self.check_range(proposal)?;
        self.check_deltas(proposal)?;
        self.check_safety(proposal, now)
    }

    /// Validate and commit new parameters
    ///
    /// Returns the observation describing the change.
    pub fn propose_update(
        &mut self,
        new_slope: Fixed,
        new_intercept: Fixed,
        now: u64,
    ) -> Result<Observation> {
        let proposal = DiscountParameters::new(new_slope, new_intercept);
        if let Err(err) = self.validate(proposal, now) {
            warn!(
                slope = new_slope,
                intercept = new_intercept,
                now,
                error = %err,
                "Parameter update rejected"
            );
            return Err(err);
        }

        let old = self.params;
        self.params = proposal;
        self.last_update = now;
        info!(
            old_slope = old.slope,
            old_intercept = old.intercept,
            slope = new_slope,
            intercept = new_intercept,
            now,
            "Discount parameters updated"
        );

        Ok(Observation::ParameterChanged {
            old_slope: old.slope,
            old_intercept: old.intercept,
            slope: new_slope,
            intercept: new_intercept,
        })
    }

    /// Set the slope from an expected annual yield and zero the intercept
    pub fn propose_update_from_target_yield(
        &mut self,
        expected_annual_yield: Fixed,
        now: u64,
    ) -> Result<Observation> {
        let slope = DiscountModel::slope_from_target_yield(expected_annual_yield)?;
        self.propose_update(slope, 0, now)
    }

    /// Replace the limits; not rate limited
    pub fn set_limits(&mut self, limits: UpdateLimits) -> Observation {
        let old_limits = self.limits;
        self.limits = limits;
        info!(?old_limits, ?limits, "Update limits replaced");
        Observation::LimitsChanged { old_limits, limits }
    }

    fn check_rate_limit(&self, now: u64) -> Result<()> {
        let not_before = self
            .last_update
            .saturating_add(self.limits.min_update_interval);
        if now > not_before {
            Ok(())
        } else {
            Err(OracleError::RateLimited { not_before })
        }
    }

    fn check_range(&self, proposal: DiscountParameters) -> Result<()> {
        if proposal.slope > SCALE {
            return Err(OracleError::OutOfRange {
                field: ParameterField::Slope,
                value: proposal.slope,
                max: SCALE,
            });
        }
        if proposal.intercept > SCALE {
            return Err(OracleError::OutOfRange {
                field: ParameterField::Intercept,
                value: proposal.intercept,
                max: SCALE,
            });
        }
        Ok(())
    }

    fn check_deltas(&self, proposal: DiscountParameters) -> Result<()> {
        check_delta(
            ParameterField::Slope,
            self.params.slope,
            proposal.slope,
            self.limits.max_slope_delta,
        )?;
        check_delta(
            ParameterField::Intercept,
            self.params.intercept,
            proposal.intercept,
            self.limits.max_intercept_delta,
        )
    }

    fn check_safety(&self, proposal: DiscountParameters, now: u64) -> Result<()> {
        let discount = self.model.discount(proposal, self.safety_horizon(now))?;
        if discount >= SCALE {
            return Err(OracleError::InvariantViolation { discount });
        }
        Ok(())
    }
}

fn check_delta(
    field: ParameterField,
    current: Fixed,
    proposed: Fixed,
    limit: Option<Fixed>,
) -> Result<()> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let delta = current.abs_diff(proposed);
    if delta > limit {
        return Err(OracleError::DeltaExceeded {
            field,
            delta,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptoracle_common::SECONDS_PER_YEAR;

    const DAY: u64 = 86_400;
    const T0: u64 = 1_700_000_000;
    const PCT: Fixed = SCALE / 100;

    fn store_with(params: DiscountParameters, limits: UpdateLimits, maturity: u64) -> ParameterStore {
        ParameterStore::new(
            params,
            limits,
            maturity,
            T0,
            SafetyBound::RemainingLifetime,
            DiscountModel::default(),
        )
        .unwrap()
    }

    fn default_store() -> ParameterStore {
        store_with(
            DiscountParameters::new(5 * PCT, 0),
            UpdateLimits::default(),
            T0 + 30 * DAY,
        )
    }

    #[test]
    fn test_initial_state() {
        let store = default_store();
        assert_eq!(store.parameters(), DiscountParameters::new(5 * PCT, 0));
        assert_eq!(store.last_update(), T0);
        assert_eq!(store.issued_at(), T0);
    }

    #[test]
    fn test_update_commits() {
        let mut store = default_store();
        let obs = store.propose_update(200, 100, T0 + DAY + 1).unwrap();

        assert_eq!(store.parameters(), DiscountParameters::new(200, 100));
        assert_eq!(store.last_update(), T0 + DAY + 1);
        assert_eq!(
            obs,
            Observation::ParameterChanged {
                old_slope: 5 * PCT,
                old_intercept: 0,
                slope: 200,
                intercept: 100,
            }
        );
    }

    #[test]
    fn test_rate_limit_is_strict() {
        let mut store = default_store();
        store.propose_update(200, 100, T0 + DAY + 1).unwrap();
        let first = store.last_update();

        for now in [first, first + DAY - 1, first + DAY] {
            assert_eq!(
                store.propose_update(300, 150, now),
                Err(OracleError::RateLimited { not_before: first + DAY })
            );
        }
        assert_eq!(store.parameters(), DiscountParameters::new(200, 100));

        store.propose_update(300, 150, first + DAY + 1).unwrap();
        assert_eq!(store.parameters(), DiscountParameters::new(300, 150));
    }

    #[test]
    fn test_range_checks() {
        let mut store = default_store();
        let now = T0 + DAY + 1;

        assert!(matches!(
            store.propose_update(1_000, SCALE + 1, now),
            Err(OracleError::OutOfRange { field: ParameterField::Intercept, .. })
        ));
        assert!(matches!(
            store.propose_update(SCALE + 1, 1_000, now),
            Err(OracleError::OutOfRange { field: ParameterField::Slope, .. })
        ));
        assert_eq!(store.last_update(), T0);
    }

    #[test]
    fn test_rate_limit_wins_over_range() {
        let mut store = default_store();
        assert!(matches!(
            store.propose_update(SCALE + 1, 0, T0 + 1),
            Err(OracleError::RateLimited { .. })
        ));
    }

    #[test]
    fn test_slope_delta_limit() {
        let mut store = default_store();
        store.set_limits(UpdateLimits::new(DAY, Some(2 * PCT), None));
        let now = T0 + DAY + 1;

        assert_eq!(
            store.propose_update(8 * PCT, 0, now),
            Err(OracleError::DeltaExceeded {
                field: ParameterField::Slope,
                delta: 3 * PCT,
                limit: 2 * PCT,
            })
        );

        store.propose_update(65 * PCT / 10, 0, now).unwrap();
        assert_eq!(store.parameters().slope, 65 * PCT / 10);

        // decreases are bounded the same way
        store.propose_update(5 * PCT, 0, now + DAY + 1).unwrap();
        assert_eq!(store.parameters().slope, 5 * PCT);
    }

    #[test]
    fn test_intercept_delta_limit() {
        let mut store = default_store();
        store.propose_update(5 * PCT, 3 * PCT, T0 + DAY + 1).unwrap();
        store.set_limits(UpdateLimits::new(DAY, None, Some(15 * PCT / 10)));
        let now = T0 + 2 * DAY + 2;

        assert!(matches!(
            store.propose_update(5 * PCT, 5 * PCT, now),
            Err(OracleError::DeltaExceeded { field: ParameterField::Intercept, .. })
        ));
        store.propose_update(5 * PCT, 4 * PCT, now).unwrap();
        assert_eq!(store.parameters().intercept, 4 * PCT);
    }

    #[test]
    fn test_unbounded_limits_allow_large_moves() {
        let mut store = store_with(
            DiscountParameters::new(5 * PCT, PCT),
            UpdateLimits::default(),
            T0 + 30 * DAY,
        );
        store.propose_update(90 * PCT, 80 * PCT, T0 + DAY + 1).unwrap();
        assert_eq!(store.parameters(), DiscountParameters::new(90 * PCT, 80 * PCT));
    }

    #[test]
    fn test_full_discount_rejected_at_construction() {
        let result = ParameterStore::new(
            DiscountParameters::new(0, SCALE),
            UpdateLimits::default(),
            T0 + 365 * DAY,
            T0,
            SafetyBound::RemainingLifetime,
            DiscountModel::default(),
        );
        assert_eq!(result.unwrap_err(), OracleError::InvariantViolation { discount: SCALE });
    }

    #[test]
    fn test_unsafe_update_rejected() {
        let mut store = store_with(
            DiscountParameters::new(10 * PCT, 0),
            UpdateLimits::default(),
            T0 + SECONDS_PER_YEAR,
        );
        // 60% * ~1 year + 45%
        let now = T0 + DAY + 1;
        let result = store.propose_update(60 * PCT, 45 * PCT, now);
        assert!(matches!(result, Err(OracleError::InvariantViolation { .. })));
        assert_eq!(store.parameters(), DiscountParameters::new(10 * PCT, 0));
        assert_eq!(store.last_update(), T0);
    }

    #[test]
    fn test_full_term_bound_is_stricter() {
        let maturity = T0 + SECONDS_PER_YEAR;
        let params = DiscountParameters::new(50 * PCT, 0);
        let mut remaining = store_with(params, UpdateLimits::unbounded(0), maturity);
        let mut full_term = ParameterStore::new(
            params,
            UpdateLimits::unbounded(0),
            maturity,
            T0,
            SafetyBound::FullTerm,
            DiscountModel::default(),
        )
        .unwrap();

        // half a year left: 90% * 0.5 + 50% = 95% now, 140% over the full term
        let now = T0 + SECONDS_PER_YEAR / 2;
        assert!(remaining.propose_update(90 * PCT, 50 * PCT, now).is_ok());
        assert!(matches!(
            full_term.propose_update(90 * PCT, 50 * PCT, now),
            Err(OracleError::InvariantViolation { .. })
        ));
        assert_eq!(full_term.safety_horizon(now), SECONDS_PER_YEAR);
    }

    #[test]
    fn test_target_yield_sets_zero_intercept() {
        let mut store = default_store();
        store.propose_update(5 * PCT, 2 * PCT, T0 + DAY + 1).unwrap();

        store
            .propose_update_from_target_yield(10 * PCT, T0 + 2 * DAY + 2)
            .unwrap();

        let params = store.parameters();
        assert_eq!(params.intercept, 0);
        assert!(params.slope.abs_diff(90_909_090_909_090_909) <= 1);
    }

    #[test]
    fn test_target_yield_respects_slope_limit() {
        let mut store = default_store();
        store.set_limits(UpdateLimits::new(DAY, Some(2 * PCT), Some(PCT)));
        let now = T0 + DAY + 1;

        // 10% yield -> ~9.09% slope, 4.09% away from 5%
        assert!(matches!(
            store.propose_update_from_target_yield(10 * PCT, now),
            Err(OracleError::DeltaExceeded { field: ParameterField::Slope, .. })
        ));

        store
            .propose_update_from_target_yield(65 * PCT / 10, now)
            .unwrap();
        let slope = store.parameters().slope;
        assert!(slope > 5 * PCT && slope < 7 * PCT);
    }

    #[test]
    fn test_target_yield_out_of_range_before_rate_limit() {
        let mut store = default_store();
        assert!(matches!(
            store.propose_update_from_target_yield(0, T0),
            Err(OracleError::OutOfRange { field: ParameterField::TargetYield, .. })
        ));
    }

    #[test]
    fn test_set_limits_is_not_rate_limited() {
        let mut store = default_store();
        let first = store.set_limits(UpdateLimits::new(172_800, Some(2 * PCT), Some(3 * PCT)));
        store.set_limits(UpdateLimits::new(100_000, None, None));

        assert_eq!(store.limits(), UpdateLimits::new(100_000, None, None));
        assert_eq!(
            first,
            Observation::LimitsChanged {
                old_limits: UpdateLimits::default(),
                limits: UpdateLimits::new(172_800, Some(2 * PCT), Some(3 * PCT)),
            }
        );
    }
}
