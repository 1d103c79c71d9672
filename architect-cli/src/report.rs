//! Plain-text rendering of results, diagnoses and presets for the terminal.

use std::fmt::Write;

use architect_core::domain::{price_headers, Metrics, OptimizationResult, StrategyKind};
use architect_core::{BenchmarkKind, RegimeDiagnosis, SavedPreset};

pub fn diagnosis(d: &RegimeDiagnosis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", d.title());
    let _ = writeln!(out, "  {} {}", d.description(), d.implication());
    let _ = writeln!(
        out,
        "  lookback {} days ({}), shrinkage {:.2} ({})",
        d.lookback_days,
        d.timeframe.label(),
        d.shrinkage,
        d.noise.label()
    );
    let _ = writeln!(out, "  stable: {}", if d.is_stable { "yes" } else { "no" });
    let _ = writeln!(out, "  recommended: {}", d.recommended.title());
    out
}

fn metrics_line(out: &mut String, label: &str, m: &Metrics) {
    let var = m
        .value_at_risk
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "  {label:<16} {:>8.2}% {:>8.2}% {:>7.2} {:>8}",
        m.ret, m.volatility, m.sharpe, var
    );
}

fn header(out: &mut String) {
    let _ = writeln!(
        out,
        "  {:<16} {:>9} {:>9} {:>7} {:>8}",
        "", "Return", "Vol", "Sharpe", "VaR 95"
    );
}

/// Per-strategy and per-benchmark metrics with allocations.
///
/// `bounds` are the min/max weights of the request; tickers pinned at either
/// bound are marked with `*` for strategies that honour bounds.
pub fn result(
    result: &OptimizationResult,
    recommended: Option<StrategyKind>,
    bounds: (f64, f64),
) -> String {
    let mut out = String::new();

    for kind in StrategyKind::ALL {
        let Some(strategy) = result.strategy(kind) else {
            continue;
        };
        let badge = if recommended == Some(kind) { " [recommended]" } else { "" };
        let _ = writeln!(out, "\n{}{badge}", kind.title());
        header(&mut out);
        metrics_line(&mut out, "unconstrained", &strategy.unconstrained.metrics);
        if let Some(c) = &strategy.constrained {
            metrics_line(&mut out, "constrained", &c.metrics);
        }
        if let Some(signal) = strategy.rebalance_signal() {
            let _ = writeln!(out, "  rebalance: {}", signal.label());
        }

        let primary = strategy.primary();
        let hits = if kind.supports_bounds() {
            primary.bound_hits(bounds.0, bounds.1)
        } else {
            Vec::new()
        };
        for (ticker, weight) in primary.sorted_allocation() {
            let mark = if hits.contains(&ticker) { " *" } else { "" };
            let _ = writeln!(out, "    {ticker:<8} {weight:>7.2}%{mark}");
        }
    }

    for kind in BenchmarkKind::ALL {
        let Some(bench) = result.benchmark(kind) else {
            continue;
        };
        let _ = writeln!(out, "\n{} (benchmark)", kind.title());
        header(&mut out);
        metrics_line(
            &mut out,
            "fixed",
            &Metrics {
                ret: bench.ret,
                sharpe: bench.sharpe,
                volatility: bench.volatility,
                value_at_risk: bench.value_at_risk,
            },
        );
        for (ticker, weight) in bench.sorted_allocation() {
            let _ = writeln!(out, "    {ticker:<8} {weight:>7.2}%");
        }
    }

    let markers = result.frontier_markers();
    if !markers.is_empty() {
        let _ = writeln!(out, "\nFrontier position (vol, return)");
        for m in markers {
            let _ = writeln!(
                out,
                "  {:<16} {:>8.2}% {:>8.2}%",
                m.strategy.label(),
                m.volatility,
                m.ret
            );
        }
    }

    recent_prices(&mut out, result);
    out
}

/// Last few rows of the recent-prices table.
fn recent_prices(out: &mut String, result: &OptimizationResult) {
    const ROWS: usize = 5;
    let headers = price_headers(&result.recent_prices);
    if headers.is_empty() {
        return;
    }
    let _ = write!(out, "\nRecent prices\n  {:<10}", "date");
    for h in &headers {
        let _ = write!(out, " {h:>10}");
    }
    let _ = writeln!(out);

    let skip = result.recent_prices.len().saturating_sub(ROWS);
    for row in result.recent_prices.iter().skip(skip) {
        let _ = write!(out, "  {:<10}", row.date.format("%Y-%m-%d").to_string());
        for h in &headers {
            match row.prices.get(h) {
                Some(p) => {
                    let _ = write!(out, " {p:>10.2}");
                }
                None => {
                    let _ = write!(out, " {:>10}", "-");
                }
            }
        }
        let _ = writeln!(out);
    }
}

pub fn preset_list(presets: &[SavedPreset]) -> String {
    if presets.is_empty() {
        return "No saved presets.\n".to_string();
    }
    let mut out = String::new();
    for (i, p) in presets.iter().enumerate() {
        let c = &p.config;
        let tickers = c
            .tickers
            .as_ref()
            .map(|t| t.join(", "))
            .unwrap_or_else(|| "-".to_string());
        let bounds = match (c.min_weight, c.max_weight) {
            (Some(min), Some(max)) => format!("{min}-{max}%"),
            _ => "-".to_string(),
        };
        let target = match (c.leverage_target_value, c.leverage_target_mode) {
            (Some(v), Some(mode)) if v > 0.0 => format!("{v} {mode}"),
            _ => "no leverage".to_string(),
        };
        let _ = writeln!(out, "{i:>3}  {:<20} {tickers}  [{bounds}, {target}]", p.name);
    }
    out
}
