//! Principal token pricing engine
//!
//! Composes the discount model, the parameter store, and the price cache
//! behind one lock. Readers copy a consistent snapshot under the read lock;
//! mutations validate and commit under the write lock, so a half-applied
//! update is never visible.

use std::sync::Arc;

use parking_lot::RwLock;
use ptoracle_common::{
    AuditRecord, AuditSink, Clock, DiscountParameters, Fixed, MaturitySource, Observation,
    OracleError, PriceFeed, Result, SafetyBound, UpdateLimits, SECONDS_PER_YEAR,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::governance::store::ParameterStore;
use crate::pricing::cache::PriceCache;
use crate::pricing::discount::DiscountModel;

/// Engine construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Slope and intercept at issuance
    pub initial_parameters: DiscountParameters,
    /// Limits on later parameter changes
    pub limits: UpdateLimits,
    /// Horizon used to safety-check parameters
    #[serde(default)]
    pub safety_bound: SafetyBound,
    /// Year length for the time-to-maturity fraction
    pub seconds_per_year: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_parameters: DiscountParameters::default(),
            limits: UpdateLimits::default(),
            safety_bound: SafetyBound::default(),
            seconds_per_year: SECONDS_PER_YEAR,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_parameters: DiscountParameters) -> Self {
        Self {
            initial_parameters,
            ..Self::default()
        }
    }

    pub fn with_limits(mut self, limits: UpdateLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_safety_bound(mut self, safety_bound: SafetyBound) -> Self {
        self.safety_bound = safety_bound;
        self
    }
}

struct EngineState {
    store: ParameterStore,
    cache: PriceCache,
}

/// Prices a principal token from an underlying feed
pub struct PricingEngine {
    state: RwLock<EngineState>,
    maturity: u64,
    model: DiscountModel,
    feed: Arc<dyn PriceFeed>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
}

impl PricingEngine {
    /// Create an engine
    ///
    /// Reads the maturity source once. Fails if it is unreachable or if the
    /// initial parameters are out of range or unsafe.
    pub fn new(
        config: EngineConfig,
        maturity_source: &dyn MaturitySource,
        feed: Arc<dyn PriceFeed>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let maturity = maturity_source.maturity_timestamp()?;
        let now = clock.now();
        let model = DiscountModel::new(config.seconds_per_year);
        let store = ParameterStore::new(
            config.initial_parameters,
            config.limits,
            maturity,
            now,
            config.safety_bound,
            model,
        )?;

        info!(
            maturity,
            now,
            slope = config.initial_parameters.slope,
            intercept = config.initial_parameters.intercept,
            "Pricing engine initialized"
        );

        Ok(Self {
            state: RwLock::new(EngineState {
                store,
                cache: PriceCache::new(),
            }),
            maturity,
            model,
            feed,
            clock,
            audit,
        })
    }

    /// Current price without touching the cache
    ///
    /// After maturity this is the raw underlying price. Before maturity it is
    /// the price cached this second if there is one, otherwise a fresh
    /// computation from the live feed.
    pub fn read_price(&self) -> Result<Fixed> {
        let now = self.clock.now();
        if self.is_matured_at(now) {
            return self.read_underlying();
        }

        let (params, cached) = {
            let state = self.state.read();
            (state.store.parameters(), state.cache.fresh_price(now))
        };
        if let Some(price) = cached {
            return Ok(price);
        }

        let underlying = self.read_underlying()?;
        self.compute(params, underlying, now)
    }

    /// Recompute and cache the price, at most once per second
    ///
    /// After maturity the raw underlying price is returned and nothing is
    /// cached.
    #[instrument(skip(self))]
    pub fn refresh_price(&self) -> Result<Fixed> {
        let now = self.clock.now();
        if self.is_matured_at(now) {
            debug!(now, maturity = self.maturity, "Matured, passing through underlying");
            return self.read_underlying();
        }

        let mut state = self.state.write();
        if let Some(price) = state.cache.fresh_price(now) {
            return Ok(price);
        }

        let underlying = self.read_underlying()?;
        let price = self.compute(state.store.parameters(), underlying, now)?;
        let stored = state.cache.store(price, now);
        drop(state);

        if stored {
            self.emit(Observation::PriceUpdated {
                price,
                timestamp: now,
            });
        }
        Ok(price)
    }

    pub(crate) fn propose_update(
        &self,
        new_slope: Fixed,
        new_intercept: Fixed,
    ) -> Result<DiscountParameters> {
        let now = self.clock.now();
        let (observation, params) = {
            let mut state = self.state.write();
            let observation = state.store.propose_update(new_slope, new_intercept, now)?;
            (observation, state.store.parameters())
        };
        self.emit(observation);
        Ok(params)
    }

    pub(crate) fn propose_update_from_target_yield(
        &self,
        expected_annual_yield: Fixed,
    ) -> Result<DiscountParameters> {
        let now = self.clock.now();
        let (observation, params) = {
            let mut state = self.state.write();
            let observation = state
                .store
                .propose_update_from_target_yield(expected_annual_yield, now)?;
            (observation, state.store.parameters())
        };
        self.emit(observation);
        Ok(params)
    }

    pub(crate) fn set_limits(&self, limits: UpdateLimits) {
        let observation = self.state.write().store.set_limits(limits);
        self.emit(observation);
    }

    pub fn parameters(&self) -> DiscountParameters {
        self.state.read().store.parameters()
    }

    pub fn limits(&self) -> UpdateLimits {
        self.state.read().store.limits()
    }

    pub fn maturity(&self) -> u64 {
        self.maturity
    }

    pub fn last_parameter_update(&self) -> u64 {
        self.state.read().store.last_update()
    }

    /// Last cached price (0 before the first refresh)
    pub fn cached_price(&self) -> Fixed {
        self.state.read().cache.price()
    }

    pub fn cache_timestamp(&self) -> Option<u64> {
        self.state.read().cache.updated_at()
    }

    pub fn is_matured(&self) -> bool {
        self.is_matured_at(self.clock.now())
    }

    /// Seconds until maturity, 0 once matured
    pub fn time_to_maturity(&self) -> u64 {
        self.maturity.saturating_sub(self.clock.now())
    }

    pub fn model(&self) -> DiscountModel {
        self.model
    }

    fn is_matured_at(&self, now: u64) -> bool {
        now >= self.maturity
    }

    fn read_underlying(&self) -> Result<Fixed> {
        self.feed.current_price().map_err(|e| {
            warn!(error = %e, "Underlying price read failed");
            OracleError::from(e)
        })
    }

    fn compute(&self, params: DiscountParameters, underlying: Fixed, now: u64) -> Result<Fixed> {
        let time_to_maturity = self.maturity - now;
        self.model
            .price(params, underlying, time_to_maturity)
            .map_err(|e| {
                if let OracleError::InvariantViolation { discount } = e {
                    error!(
                        discount,
                        slope = params.slope,
                        intercept = params.intercept,
                        time_to_maturity,
                        "Live discount reached 100%"
                    );
                }
                e
            })
    }

    fn emit(&self, observation: Observation) {
        self.audit.write(&AuditRecord::new(observation));
    }
}
