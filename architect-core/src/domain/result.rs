//! Optimization result — the service response and its per-strategy payloads.
//!
//! Field names follow the service's JSON (`snake_case`, `"return"`, `"var"`).
//! Optional pieces (constrained variant, benchmark drawdowns, frontier cloud,
//! dendrogram) deserialize to `None`/empty instead of failing the whole response.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::strategy::{BenchmarkKind, StrategyKind};

/// One point of a dated series (growth-of-100 curve or drawdown curve).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Headline risk/return metrics, all in percent except `sharpe`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(rename = "return")]
    pub ret: f64,
    pub sharpe: f64,
    pub volatility: f64,
    /// 95% daily historical VaR as a positive percentage.
    #[serde(rename = "var", alias = "value_at_risk", default)]
    pub value_at_risk: Option<f64>,
}

/// Parallel arrays: weight and share of portfolio risk per ticker, in percent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskDecomposition {
    pub tickers: Vec<String>,
    pub weights: Vec<f64>,
    pub risk_contribution: Vec<f64>,
}

impl RiskDecomposition {
    /// Tickers that actually carry weight in the portfolio.
    pub fn active_tickers(&self) -> Vec<String> {
        self.tickers
            .iter()
            .zip(self.weights.iter())
            .filter(|(_, w)| **w > 0.0)
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Rows of (ticker, weight, risk contribution). Ragged arrays are truncated
    /// to the shortest length.
    pub fn rows(&self) -> Vec<(&str, f64, f64)> {
        self.tickers
            .iter()
            .zip(self.weights.iter())
            .zip(self.risk_contribution.iter())
            .map(|((t, &w), &r)| (t.as_str(), w, r))
            .collect()
    }
}

/// Rebalance advice attached to a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RebalanceSignal {
    RebalanceRequired,
    Hold,
    Other(String),
}

impl From<String> for RebalanceSignal {
    fn from(s: String) -> Self {
        match s.trim() {
            "REBALANCE_REQUIRED" | "REBALANCE REQUIRED" => RebalanceSignal::RebalanceRequired,
            "HOLD" => RebalanceSignal::Hold,
            _ => RebalanceSignal::Other(s),
        }
    }
}

impl From<RebalanceSignal> for String {
    fn from(signal: RebalanceSignal) -> Self {
        match signal {
            RebalanceSignal::RebalanceRequired => "REBALANCE_REQUIRED".to_string(),
            RebalanceSignal::Hold => "HOLD".to_string(),
            RebalanceSignal::Other(s) => s,
        }
    }
}

impl RebalanceSignal {
    pub fn label(&self) -> &str {
        match self {
            RebalanceSignal::RebalanceRequired => "REBALANCE REQUIRED",
            RebalanceSignal::Hold => "HOLD",
            RebalanceSignal::Other(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebalance {
    pub signal: RebalanceSignal,
}

/// One variant (unconstrained or constrained) of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyVariant {
    pub metrics: Metrics,
    /// Ticker → weight in percent.
    pub allocation: BTreeMap<String, f64>,
    #[serde(default)]
    pub history: Vec<SeriesPoint>,
    #[serde(default)]
    pub drawdowns: Vec<SeriesPoint>,
    #[serde(default)]
    pub risk_decomposition: RiskDecomposition,
}

impl StrategyVariant {
    /// Allocation sorted by weight descending, ties by ticker.
    pub fn sorted_allocation(&self) -> Vec<(String, f64)> {
        sorted_allocation(&self.allocation)
    }

    /// Tickers pinned exactly at the configured minimum or maximum weight.
    pub fn bound_hits(&self, min_weight: f64, max_weight: f64) -> Vec<String> {
        const EPS: f64 = 1e-9;
        self.sorted_allocation()
            .into_iter()
            .filter(|(_, w)| (w - min_weight).abs() < EPS || (w - max_weight).abs() < EPS)
            .map(|(t, _)| t)
            .collect()
    }
}

/// Sort a ticker → weight map by weight descending, ties by ticker ascending.
pub fn sorted_allocation(allocation: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    let mut rows: Vec<(String, f64)> =
        allocation.iter().map(|(t, w)| (t.clone(), *w)).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// A strategy's result. HRP may omit `constrained`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub unconstrained: StrategyVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constrained: Option<StrategyVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance: Option<Rebalance>,
}

impl StrategyResult {
    /// The variant the dashboard leads with: constrained when present.
    pub fn primary(&self) -> &StrategyVariant {
        self.constrained.as_ref().unwrap_or(&self.unconstrained)
    }

    pub fn drawdowns(&self) -> &[SeriesPoint] {
        &self.primary().drawdowns
    }

    pub fn risk_decomposition(&self) -> &RiskDecomposition {
        &self.primary().risk_decomposition
    }

    pub fn rebalance_signal(&self) -> Option<&RebalanceSignal> {
        self.rebalance.as_ref().map(|r| &r.signal)
    }
}

/// A fixed-weight benchmark portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    #[serde(rename = "return")]
    pub ret: f64,
    pub sharpe: f64,
    pub volatility: f64,
    #[serde(rename = "var", alias = "value_at_risk", default)]
    pub value_at_risk: Option<f64>,
    pub allocation: BTreeMap<String, f64>,
    #[serde(default)]
    pub history: Vec<SeriesPoint>,
    #[serde(default)]
    pub drawdowns: Vec<SeriesPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_decomposition: Option<RiskDecomposition>,
}

impl BenchmarkResult {
    pub fn sorted_allocation(&self) -> Vec<(String, f64)> {
        sorted_allocation(&self.allocation)
    }
}

/// Correlation matrix over the requested tickers, rows and columns in `tickers` order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Restrict to `keep`, preserving matrix order. An empty `keep` keeps everything.
    pub fn filtered(&self, keep: &[String]) -> CorrelationMatrix {
        let indices: Vec<usize> = if keep.is_empty() {
            (0..self.tickers.len()).collect()
        } else {
            self.tickers
                .iter()
                .enumerate()
                .filter(|(_, t)| keep.contains(*t))
                .map(|(i, _)| i)
                .collect()
        };

        let matrix = indices
            .iter()
            .map(|&i| {
                indices
                    .iter()
                    .map(|&j| {
                        self.matrix
                            .get(i)
                            .and_then(|row| row.get(j))
                            .copied()
                            .unwrap_or(f64::NAN)
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            tickers: indices.iter().map(|&i| self.tickers[i].clone()).collect(),
            matrix,
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.matrix.get(i)?.get(j).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default)]
    pub correlation: CorrelationMatrix,
}

/// One randomly sampled portfolio in (volatility, return) space, percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
    #[serde(rename = "x")]
    pub volatility: f64,
    #[serde(rename = "y")]
    pub ret: f64,
}

/// Service-side diagnostics of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Trailing trading days selected for estimation.
    pub lookback: u32,
    /// Covariance shrinkage intensity in [0, 1].
    pub shrinkage: f64,
    #[serde(default)]
    pub diagnostics: Diagnostics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontier: Option<Vec<FrontierPoint>>,
    /// Base64-encoded PNG of the HRP clustering tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dendrogram: Option<String>,
}

/// A row of the recent-prices table: a date plus one closing price per ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub prices: BTreeMap<String, f64>,
}

/// Column headers of the recent-prices table: every ticker of the first row.
pub fn price_headers(rows: &[PriceRow]) -> Vec<String> {
    rows.first()
        .map(|r| r.prices.keys().cloned().collect())
        .unwrap_or_default()
}

/// The full optimization response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub strategies: BTreeMap<String, StrategyResult>,
    pub benchmarks: BTreeMap<String, BenchmarkResult>,
    pub meta: Meta,
    pub recent_prices: Vec<PriceRow>,
}

impl OptimizationResult {
    pub fn strategy(&self, kind: StrategyKind) -> Option<&StrategyResult> {
        self.strategies.get(kind.label())
    }

    pub fn benchmark(&self, kind: BenchmarkKind) -> Option<&BenchmarkResult> {
        self.benchmarks.get(kind.label())
    }

    /// Global correlation matrix restricted to the assets a strategy holds.
    pub fn strategy_correlation(&self, kind: StrategyKind) -> Option<CorrelationMatrix> {
        let strategy = self.strategy(kind)?;
        let active = strategy.risk_decomposition().active_tickers();
        Some(self.meta.diagnostics.correlation.filtered(&active))
    }

    /// Where each strategy sits on the frontier map: Risk Parity and Max Sharpe
    /// use their constrained variant, HRP its unconstrained one.
    pub fn frontier_markers(&self) -> Vec<FrontierMarker> {
        StrategyKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let strategy = self.strategy(kind)?;
                let variant = match kind {
                    StrategyKind::Hrp => &strategy.unconstrained,
                    _ => strategy.constrained.as_ref()?,
                };
                Some(FrontierMarker {
                    strategy: kind,
                    volatility: variant.metrics.volatility,
                    ret: variant.metrics.ret,
                })
            })
            .collect()
    }
}

/// A strategy's position on the frontier map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontierMarker {
    pub strategy: StrategyKind,
    pub volatility: f64,
    pub ret: f64,
}
