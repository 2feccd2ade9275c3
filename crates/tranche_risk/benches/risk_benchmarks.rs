//! Criterion benchmarks for tranche_risk allocators and stress runs.
//!
//! Benchmarks cover:
//! - Yield waterfall at partial and full coverage
//! - Proportional loss with and without liquidity caps
//! - Tier loss waterfall
//! - Sequential versus rayon batch stress runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tranche_core::config::default_tvl_shares;
use tranche_core::types::{LiquidityProfile, Position, RiskRange};
use tranche_core::EngineConfig;
use tranche_risk::loss::{ProportionalLossDistributor, TierBook, TierLossWaterfall};
use tranche_risk::scenarios::{BatchStressRunner, StressRunner};
use tranche_risk::waterfall::YieldWaterfall;

/// Deterministic uneven profile.
fn generate_profile() -> LiquidityProfile {
    let amounts: Vec<f64> = (0..100)
        .map(|i| 1_000.0 + ((i * 37) % 100) as f64 * 25.0)
        .collect();
    LiquidityProfile::from_liquidity(&amounts).unwrap()
}

/// Generate positions spread over the scale.
fn generate_positions(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let min = ((i * 7) % 80) as i64;
            let range = RiskRange::new(min, min + 19).unwrap();
            Position::new(1_000.0 + i as f64, range).unwrap()
        })
        .collect()
}

/// Benchmark the yield waterfall.
fn bench_yield_waterfall(c: &mut Criterion) {
    let mut group = c.benchmark_group("yield_waterfall");
    let waterfall = YieldWaterfall::new(&EngineConfig::default()).unwrap();
    let profile = generate_profile();
    let total_need: f64 = waterfall.needs(&profile).iter().sum();

    for (label, fraction) in [("partial", 0.5), ("full", 2.0)] {
        let total_yield = total_need * fraction;
        group.bench_with_input(
            BenchmarkId::new("distribute", label),
            &total_yield,
            |b, &y| {
                b.iter(|| waterfall.distribute_yield(black_box(y), &profile).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark both loss policies.
fn bench_loss(c: &mut Criterion) {
    let mut group = c.benchmark_group("loss");
    let config = EngineConfig::default();
    let profile = generate_profile();
    let proportional = ProportionalLossDistributor::new(&config).unwrap();

    // Small loss places in one pass; large loss caps many segments
    for loss in [10_000.0, 200_000.0] {
        group.bench_with_input(BenchmarkId::new("proportional", loss), &loss, |b, &l| {
            b.iter(|| proportional.distribute_loss(black_box(l), &profile).unwrap());
        });
    }

    let tiered = TierLossWaterfall::new(&config).unwrap();
    let book = TierBook::from_total(1_000_000.0, &default_tvl_shares()).unwrap();
    group.bench_function("tiered", |b| {
        b.iter(|| tiered.distribute(black_box(200_000.0), &book, 0.2).unwrap());
    });

    group.finish();
}

/// Benchmark sequential versus parallel stress runs.
fn bench_stress(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress");
    let config = EngineConfig::default();
    let runner = StressRunner::new(&config).unwrap();
    let batch = BatchStressRunner::new(&config).unwrap();

    for n in [100_usize, 1000, 10000] {
        let positions = generate_positions(n);

        group.bench_with_input(BenchmarkId::new("sequential", n), &positions, |b, positions| {
            b.iter(|| {
                positions
                    .iter()
                    .map(|p| {
                        runner
                            .run_range(p.amount, p.range, 1_000_000.0, runner.severities())
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            });
        });

        group.bench_with_input(BenchmarkId::new("parallel", n), &positions, |b, positions| {
            b.iter(|| batch.run(black_box(positions), 1_000_000.0).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_yield_waterfall, bench_loss, bench_stress);
criterion_main!(benches);
