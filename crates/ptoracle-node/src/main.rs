//! PT Oracle Keeper Binary
//!
//! Periodically refreshes the cached principal token price so consumers
//! reading within the same second see one consistent value.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptoracle_common::{
    AuditLogger, AuditSink, FixedMaturity, StaticPriceFeed, SystemClock, VERSION,
};
use ptoracle_pricing::PricingEngine;

use crate::config::NodeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting PT oracle keeper v{}", VERSION);

    let config = NodeConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let feed = Arc::new(StaticPriceFeed::new(config.feed.price()?));
    let audit = Arc::new(AuditLogger::new());
    let engine = PricingEngine::new(
        config.engine_config()?,
        &FixedMaturity(config.instrument.maturity),
        feed,
        Arc::new(SystemClock),
        audit.clone(),
    )?;

    let period = Duration::from_secs(config.keeper.refresh_interval_secs);
    let mut ticker = tokio::time::interval(period);
    info!(
        maturity = engine.maturity(),
        period_secs = period.as_secs(),
        "Keeper running"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut matured = false;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !matured && engine.is_matured() {
                    matured = true;
                    info!("Instrument matured, price follows the underlying");
                }
                match engine.refresh_price() {
                    Ok(price) => info!(
                        price,
                        time_to_maturity = engine.time_to_maturity(),
                        "Price refreshed"
                    ),
                    Err(e) => warn!(error = %e, "Price refresh failed"),
                }
            }
            res = &mut shutdown => {
                if let Err(e) = res {
                    warn!(error = %e, "Signal handler failed");
                }
                info!("Received shutdown signal");
                break;
            }
        }
    }

    audit.flush();
    info!("Shutting down PT oracle keeper");
    Ok(())
}
