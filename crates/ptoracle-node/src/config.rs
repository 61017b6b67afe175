//! Keeper configuration
//!
//! Layered, later sources win:
//! 1. built-in defaults
//! 2. `ptoracle.toml` in the working directory (optional)
//! 3. `PTORACLE__SECTION__KEY` environment variables (after loading `.env`)
//!
//! Fractions and prices are decimal strings (`"0.05"` = 5%). A delta limit of
//! `"0"` or an omitted one means unbounded.

use anyhow::{anyhow, bail, Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use ptoracle_common::{
    DiscountParameters, Fixed, SafetyBound, UpdateLimits, DEFAULT_MIN_UPDATE_INTERVAL, SCALE,
    SECONDS_PER_YEAR,
};
use ptoracle_pricing::{DiscountModel, EngineConfig};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Keeper service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub instrument: InstrumentSettings,
    pub discount: DiscountSettings,
    pub limits: LimitSettings,
    pub feed: FeedSettings,
    pub keeper: KeeperSettings,
}

impl NodeConfig {
    /// Load configuration from `.env`, `ptoracle.toml` and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let builder = Config::builder()
            .add_source(File::with_name("ptoracle").required(false))
            .add_source(
                Environment::with_prefix("PTORACLE")
                    .prefix_separator("__")
                    .separator("__"),
            );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg: Self = builder
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("parsing configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.instrument.maturity == 0 {
            bail!("instrument.maturity must be set to a unix timestamp");
        }
        if self.keeper.refresh_interval_secs == 0 {
            bail!("keeper.refresh_interval_secs must be positive");
        }
        Ok(())
    }

    /// Engine settings derived from the discount and limit sections
    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            initial_parameters: self.discount.parameters()?,
            limits: self.limits.to_limits()?,
            safety_bound: self.discount.safety_bound,
            seconds_per_year: self.instrument.seconds_per_year,
        })
    }
}

/// The priced instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentSettings {
    /// Maturity (unix seconds)
    pub maturity: u64,
    pub seconds_per_year: u64,
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            maturity: 0,
            seconds_per_year: SECONDS_PER_YEAR,
        }
    }
}

/// Initial discount parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountSettings {
    pub slope: Decimal,
    pub intercept: Decimal,
    /// Overrides slope and intercept when set
    pub target_yield: Option<Decimal>,
    pub safety_bound: SafetyBound,
}

impl DiscountSettings {
    pub fn parameters(&self) -> Result<DiscountParameters> {
        if let Some(target_yield) = self.target_yield {
            let slope = DiscountModel::slope_from_target_yield(to_fixed(target_yield)?)?;
            return Ok(DiscountParameters::new(slope, 0));
        }
        Ok(DiscountParameters::new(
            to_fixed(self.slope)?,
            to_fixed(self.intercept)?,
        ))
    }
}

/// Update limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub min_update_interval: u64,
    pub max_slope_delta: Decimal,
    pub max_intercept_delta: Decimal,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            min_update_interval: DEFAULT_MIN_UPDATE_INTERVAL,
            max_slope_delta: Decimal::ZERO,
            max_intercept_delta: Decimal::ZERO,
        }
    }
}

impl LimitSettings {
    pub fn to_limits(&self) -> Result<UpdateLimits> {
        Ok(UpdateLimits::new(
            self.min_update_interval,
            bound(self.max_slope_delta)?,
            bound(self.max_intercept_delta)?,
        ))
    }
}

/// In-process underlying feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub price: Decimal,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            price: Decimal::ONE,
        }
    }
}

impl FeedSettings {
    pub fn price(&self) -> Result<Fixed> {
        to_fixed(self.price)
    }
}

/// Refresh loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperSettings {
    pub refresh_interval_secs: u64,
}

impl Default for KeeperSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 12,
        }
    }
}

/// Decimal fraction to fixed-point, truncating below 1e-18
pub fn to_fixed(value: Decimal) -> Result<Fixed> {
    if value.is_sign_negative() && !value.is_zero() {
        bail!("negative value {value}");
    }
    let scale = Decimal::from(SCALE as u64);
    value
        .checked_mul(scale)
        .and_then(|scaled| scaled.trunc().to_u128())
        .ok_or_else(|| anyhow!("value {value} does not fit fixed-point"))
}

fn bound(limit: Decimal) -> Result<Option<Fixed>> {
    let limit = to_fixed(limit)?;
    Ok((limit != 0).then_some(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use rust_decimal_macros::dec;

    fn from_toml(toml: &str) -> Result<NodeConfig> {
        NodeConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(dec!(1)).unwrap(), SCALE);
        assert_eq!(to_fixed(dec!(0.05)).unwrap(), SCALE / 20);
        assert_eq!(to_fixed(dec!(0.0000000000000000001)).unwrap(), 0);
        assert_eq!(to_fixed(dec!(3500.25)).unwrap(), 350_025 * SCALE / 100);
        assert!(to_fixed(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_zero_delta_is_unbounded() {
        let limits = LimitSettings {
            min_update_interval: 3_600,
            max_slope_delta: Decimal::ZERO,
            max_intercept_delta: dec!(0.01),
        };
        assert_eq!(
            limits.to_limits().unwrap(),
            UpdateLimits::new(3_600, None, Some(SCALE / 100))
        );
    }

    #[test]
    fn test_load_toml() {
        let cfg = from_toml(
            r#"
            [instrument]
            maturity = 1767225600

            [discount]
            slope = "0.05"
            intercept = "0.001"
            safety_bound = "full_term"

            [limits]
            min_update_interval = 3600
            max_slope_delta = "0.01"

            [feed]
            price = "0.998"
            "#,
        )
        .unwrap();

        let engine = cfg.engine_config().unwrap();
        assert_eq!(
            engine.initial_parameters,
            DiscountParameters::new(SCALE / 20, SCALE / 1_000)
        );
        assert_eq!(
            engine.limits,
            UpdateLimits::new(3_600, Some(SCALE / 100), None)
        );
        assert_eq!(engine.safety_bound, SafetyBound::FullTerm);
        assert_eq!(engine.seconds_per_year, SECONDS_PER_YEAR);
        assert_eq!(cfg.feed.price().unwrap(), 998 * SCALE / 1_000);
        assert_eq!(cfg.keeper.refresh_interval_secs, 12);
    }

    #[test]
    fn test_target_yield_overrides() {
        let cfg = from_toml(
            r#"
            [instrument]
            maturity = 1767225600

            [discount]
            slope = "0.5"
            intercept = "0.1"
            target_yield = "0.1"
            "#,
        )
        .unwrap();

        let params = cfg.discount.parameters().unwrap();
        assert_eq!(params.intercept, 0);
        assert!(params.slope.abs_diff(90_909_090_909_090_909) <= 1);
    }

    #[test]
    fn test_missing_maturity_rejected() {
        assert!(from_toml("[discount]\nslope = \"0.05\"").is_err());
    }

    #[test]
    fn test_bad_target_yield() {
        let settings = DiscountSettings {
            target_yield: Some(Decimal::ZERO),
            ..DiscountSettings::default()
        };
        assert!(settings.parameters().is_err());
    }
}
