//! Criterion benchmarks for the comparison-table merge.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use architect_core::domain::{
    BenchmarkResult, Metrics, RiskDecomposition, SeriesPoint, StrategyResult, StrategyVariant,
};
use architect_core::merge::merge_histories;
use architect_core::AlignmentPolicy;

fn make_history(n: usize, skip_every: usize) -> Vec<SeriesPoint> {
    let base = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    (0..n)
        .filter(|i| skip_every == 0 || i % skip_every != 0)
        .map(|i| SeriesPoint {
            date: base + Duration::days(i as i64),
            value: 100.0 + (i as f64 * 0.05).sin() * 5.0,
        })
        .collect()
}

fn variant(history: Vec<SeriesPoint>) -> StrategyVariant {
    StrategyVariant {
        metrics: Metrics::default(),
        allocation: BTreeMap::new(),
        history,
        drawdowns: Vec::new(),
        risk_decomposition: RiskDecomposition::default(),
    }
}

fn make_inputs(
    n: usize,
    skip_every: usize,
) -> (BTreeMap<String, StrategyResult>, BTreeMap<String, BenchmarkResult>) {
    let mut strategies = BTreeMap::new();
    for name in ["Risk Parity", "Max Sharpe", "HRP"] {
        let history = if name == "Risk Parity" {
            make_history(n, 0)
        } else {
            make_history(n, skip_every)
        };
        strategies.insert(
            name.to_string(),
            StrategyResult {
                unconstrained: variant(history.clone()),
                constrained: Some(variant(history)),
                rebalance: None,
            },
        );
    }

    let mut benchmarks = BTreeMap::new();
    for name in ["60/40", "Permanent"] {
        benchmarks.insert(
            name.to_string(),
            BenchmarkResult {
                ret: 0.0,
                sharpe: 0.0,
                volatility: 0.0,
                value_at_risk: None,
                allocation: BTreeMap::new(),
                history: make_history(n, skip_every),
                drawdowns: Vec::new(),
                risk_decomposition: None,
            },
        );
    }
    (strategies, benchmarks)
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_histories");

    for n in [252usize, 1260, 5040] {
        let (strategies, benchmarks) = make_inputs(n, 0);
        group.bench_with_input(BenchmarkId::new("aligned", n), &n, |b, _| {
            b.iter(|| {
                merge_histories(
                    black_box(&strategies),
                    black_box(&benchmarks),
                    AlignmentPolicy::Strict,
                )
            })
        });

        let (strategies, benchmarks) = make_inputs(n, 7);
        group.bench_with_input(BenchmarkId::new("lenient_gaps", n), &n, |b, _| {
            b.iter(|| {
                merge_histories(
                    black_box(&strategies),
                    black_box(&benchmarks),
                    AlignmentPolicy::Lenient,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
