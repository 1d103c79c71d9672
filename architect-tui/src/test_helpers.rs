//! Test helpers for building app state and canned results.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{Duration, NaiveDate};

use architect_core::domain::{
    BenchmarkResult, CorrelationMatrix, Diagnostics, Meta, Metrics, OptimizationResult,
    RiskDecomposition, SeriesPoint, StrategyResult, StrategyVariant,
};
use architect_core::{AlignmentPolicy, MemoryBackend, PresetStore};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

pub fn make_app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let presets = PresetStore::open(MemoryBackend::new());
    let app = AppState::new(cmd_tx, resp_rx, presets, AlignmentPolicy::Lenient);
    (app, cmd_rx, resp_tx)
}

fn history(start: f64, step: f64, n: usize) -> Vec<SeriesPoint> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default();
    (0..n)
        .map(|i| SeriesPoint {
            date: base + Duration::days(i as i64),
            value: start + step * i as f64,
        })
        .collect()
}

fn variant(weights: [f64; 3], ret: f64, n: usize) -> StrategyVariant {
    let tickers = vec!["VTI".to_string(), "TLT".to_string(), "GLD".to_string()];
    StrategyVariant {
        metrics: Metrics {
            ret,
            sharpe: ret / 10.0,
            volatility: 10.0,
            value_at_risk: Some(1.2),
        },
        allocation: tickers.iter().cloned().zip(weights).collect(),
        history: history(100.0, ret / 10.0, n),
        drawdowns: history(0.0, -0.1, n),
        risk_decomposition: RiskDecomposition {
            tickers,
            weights: weights.to_vec(),
            risk_contribution: vec![40.0, 35.0, 25.0],
        },
    }
}

/// A stable-regime result (lookback 300, shrinkage 0.1) with five-point histories.
pub fn sample_result() -> OptimizationResult {
    let mut strategies = BTreeMap::new();
    for (name, ret) in [("Risk Parity", 5.0), ("Max Sharpe", 8.0), ("HRP", 4.0)] {
        strategies.insert(
            name.to_string(),
            StrategyResult {
                unconstrained: variant([30.0, 40.0, 30.0], ret, 5),
                constrained: (name != "HRP").then(|| variant([40.0, 40.0, 20.0], ret, 5)),
                rebalance: None,
            },
        );
    }

    let mut benchmarks = BTreeMap::new();
    benchmarks.insert(
        "60/40".to_string(),
        BenchmarkResult {
            ret: 6.0,
            sharpe: 0.5,
            volatility: 11.0,
            value_at_risk: None,
            allocation: [("SPY".to_string(), 60.0), ("BND".to_string(), 40.0)]
                .into_iter()
                .collect(),
            history: history(100.0, 0.4, 3),
            drawdowns: Vec::new(),
            risk_decomposition: None,
        },
    );

    OptimizationResult {
        strategies,
        benchmarks,
        meta: Meta {
            lookback: 300,
            shrinkage: 0.1,
            diagnostics: Diagnostics {
                correlation: CorrelationMatrix {
                    tickers: vec!["VTI".into(), "TLT".into(), "GLD".into()],
                    matrix: vec![
                        vec![1.0, -0.3, 0.1],
                        vec![-0.3, 1.0, 0.2],
                        vec![0.1, 0.2, 1.0],
                    ],
                },
            },
            frontier: None,
            dendrogram: None,
        },
        recent_prices: Vec::new(),
    }
}
