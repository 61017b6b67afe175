//! PT pricing benchmarks
//!
//! Critical paths:
//! - Discount evaluation across horizons
//! - Cached versus uncached price reads
//! - Governance validation

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ptoracle_common::{
    DiscountParameters, FixedMaturity, ManualClock, MemoryAuditSink, SafetyBound,
    StaticPriceFeed, UpdateLimits, SCALE, SECONDS_PER_YEAR,
};
use ptoracle_pricing::{DiscountModel, EngineConfig, ParameterStore, PricingEngine};

const T0: u64 = 1_700_000_000;

// ============ MODEL BENCHMARKS ============

fn bench_discount(c: &mut Criterion) {
    let mut group = c.benchmark_group("discount");
    group.measurement_time(Duration::from_secs(5));

    let model = DiscountModel::default();
    let params = DiscountParameters::new(SCALE / 20, SCALE / 100);

    for days in [1u64, 30, 365, 3_650].iter() {
        group.bench_with_input(BenchmarkId::new("horizon_days", days), days, |b, &days| {
            let ttm = days * 86_400;
            b.iter(|| model.price(black_box(params), black_box(3_500 * SCALE), black_box(ttm)));
        });
    }

    group.bench_function("slope_from_target_yield", |b| {
        b.iter(|| DiscountModel::slope_from_target_yield(black_box(SCALE / 10)));
    });

    group.finish();
}

// ============ ENGINE BENCHMARKS ============

fn engine(clock: Arc<ManualClock>) -> PricingEngine {
    PricingEngine::new(
        EngineConfig::new(DiscountParameters::new(SCALE / 20, 0)),
        &FixedMaturity(T0 + SECONDS_PER_YEAR),
        Arc::new(StaticPriceFeed::new(SCALE)),
        clock,
        Arc::new(MemoryAuditSink::new()),
    )
    .unwrap()
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("read_price_cached", |b| {
        let engine = engine(Arc::new(ManualClock::new(T0)));
        engine.refresh_price().unwrap();
        b.iter(|| black_box(engine.read_price()));
    });

    group.bench_function("read_price_live", |b| {
        let engine = engine(Arc::new(ManualClock::new(T0)));
        b.iter(|| black_box(engine.read_price()));
    });

    group.bench_function("refresh_every_second", |b| {
        let clock = Arc::new(ManualClock::new(T0));
        let engine = engine(clock.clone());
        b.iter(|| {
            clock.advance(1);
            black_box(engine.refresh_price())
        });
    });

    group.finish();
}

// ============ GOVERNANCE BENCHMARKS ============

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("governance");

    let store = ParameterStore::new(
        DiscountParameters::new(SCALE / 20, 0),
        UpdateLimits::new(3_600, Some(SCALE / 100), Some(SCALE / 100)),
        T0 + SECONDS_PER_YEAR,
        T0,
        SafetyBound::RemainingLifetime,
        DiscountModel::default(),
    )
    .unwrap();
    let proposal = DiscountParameters::new(SCALE / 20 + SCALE / 200, SCALE / 200);

    group.bench_function("validate", |b| {
        b.iter(|| store.validate(black_box(proposal), black_box(T0 + 3_601)));
    });

    group.finish();
}

// ============ CRITERION CONFIGURATION ============

criterion_group!(model, bench_discount);

criterion_group!(engine_paths, bench_engine);

criterion_group!(governance, bench_validation);

criterion_main!(model, engine_paths, governance);
