//! Governance gateway
//!
//! The only way to mutate a [`PricingEngine`]. Every call checks the caller's
//! capability first; an unauthorized call fails without reading or touching
//! engine state.

use std::sync::Arc;

use ptoracle_common::{
    AccessGateway, Capability, DiscountParameters, Fixed, OracleError, Principal, Result,
    UpdateLimits,
};
use tracing::{instrument, warn};

use crate::pricing::engine::PricingEngine;

/// Capability-checked front door for parameter and limit changes
pub struct GovernanceGateway {
    engine: Arc<PricingEngine>,
    access: Arc<dyn AccessGateway>,
}

impl GovernanceGateway {
    pub fn new(engine: Arc<PricingEngine>, access: Arc<dyn AccessGateway>) -> Self {
        Self { engine, access }
    }

    pub fn engine(&self) -> &Arc<PricingEngine> {
        &self.engine
    }

    /// Propose new discount parameters (requires [`Capability::Manager`])
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub fn propose_update(
        &self,
        caller: &Principal,
        new_slope: Fixed,
        new_intercept: Fixed,
    ) -> Result<DiscountParameters> {
        self.authorize(caller, Capability::Manager)?;
        self.engine.propose_update(new_slope, new_intercept)
    }

    /// Derive the slope from an annual yield, zeroing the intercept
    /// (requires [`Capability::Manager`])
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub fn propose_update_from_target_yield(
        &self,
        caller: &Principal,
        expected_annual_yield: Fixed,
    ) -> Result<DiscountParameters> {
        self.authorize(caller, Capability::Manager)?;
        self.engine
            .propose_update_from_target_yield(expected_annual_yield)
    }

    /// Replace the update limits (requires [`Capability::ParameterAdmin`])
    ///
    /// A delta limit of `None` disables that check.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub fn set_limits(
        &self,
        caller: &Principal,
        new_min_interval: u64,
        new_max_slope_delta: Option<Fixed>,
        new_max_intercept_delta: Option<Fixed>,
    ) -> Result<()> {
        self.authorize(caller, Capability::ParameterAdmin)?;
        self.engine.set_limits(UpdateLimits::new(
            new_min_interval,
            new_max_slope_delta,
            new_max_intercept_delta,
        ));
        Ok(())
    }

    fn authorize(&self, caller: &Principal, capability: Capability) -> Result<()> {
        if self.access.has_capability(caller, capability) {
            return Ok(());
        }
        warn!(%caller, %capability, "Unauthorized governance call");
        Err(OracleError::Unauthorized {
            principal: caller.to_string(),
            capability,
        })
    }
}
