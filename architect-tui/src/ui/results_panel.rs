//! Panel 2 — Results: diagnosis banner, strategy/benchmark tabs, details of the
//! selected tab.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use architect_core::domain::{
    BenchmarkKind, BenchmarkResult, CorrelationMatrix, Metrics, OptimizationResult,
    RebalanceSignal, RiskDecomposition, SeriesPoint, StrategyKind, StrategyResult,
};
use architect_core::{Phase, RegimeDiagnosis, Tab};

use crate::app::AppState;
use crate::theme;

const BADGE: &str = "★";
const BOUND_MARK: &str = "◆";

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let view = &app.view;
    let mut lines: Vec<Line> = Vec::new();

    let Some(result) = view.result() else {
        let message = match view.phase() {
            Phase::Loading => "Optimizing...".to_string(),
            Phase::Failed(msg) => msg.clone(),
            Phase::Idle | Phase::Ready => {
                "No results yet. Fill in the portfolio (press 1) and press Enter.".to_string()
            }
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(message, theme::muted())));
        f.render_widget(Paragraph::new(lines), area);
        return;
    };

    if let Some(d) = view.diagnosis() {
        banner(&mut lines, d);
    }
    lines.push(tab_bar(app));
    lines.push(Line::from(""));

    match view.active_tab() {
        Tab::Strategy(kind) => match result.strategy(kind) {
            Some(strategy) => strategy_details(&mut lines, app, result, kind, strategy),
            None => missing(&mut lines, kind.title()),
        },
        Tab::Benchmark(kind) => match result.benchmark(kind) {
            Some(bench) => benchmark_details(&mut lines, kind, bench),
            None => missing(&mut lines, kind.title()),
        },
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn banner(lines: &mut Vec<Line<'_>>, d: &RegimeDiagnosis) {
    let title_style = if d.is_stable {
        theme::positive()
    } else {
        theme::warning()
    };
    lines.push(Line::from(vec![
        Span::styled(format!(" {} ", d.title()), title_style),
        Span::styled(
            format!("lookback {}d · shrinkage {:.2}", d.lookback_days, d.shrinkage),
            theme::muted(),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(" {} {}", d.description(), d.implication()),
        theme::text(),
    )));
    lines.push(Line::from(vec![
        Span::styled(" Recommended: ", theme::muted()),
        Span::styled(format!("{} {BADGE}", d.recommended.title()), theme::accent_bold()),
    ]));
    lines.push(Line::from(""));
}

fn tab_bar(app: &AppState) -> Line<'static> {
    let view = &app.view;
    let mut spans = vec![Span::raw(" ")];
    for tab in Tab::ALL {
        let mut label = tab.label().to_string();
        if view.shows_badge(tab) {
            label.push_str(&format!(" {BADGE}"));
        }
        let style = if tab == view.active_tab() {
            theme::selected()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(format!(" {label} "), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("[←/→]", theme::muted()));
    Line::from(spans)
}

fn missing(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(
        format!(" {title} is not part of this result."),
        theme::muted(),
    )));
}

fn strategy_details(
    lines: &mut Vec<Line<'_>>,
    app: &AppState,
    result: &OptimizationResult,
    kind: StrategyKind,
    strategy: &StrategyResult,
) {
    lines.push(Line::from(Span::styled(format!(" {}", kind.title()), theme::accent_bold())));
    metrics_header(lines);
    metrics_row(lines, "Unconstrained", &strategy.unconstrained.metrics);
    if let Some(constrained) = &strategy.constrained {
        metrics_row(lines, "Constrained", &constrained.metrics);
    }

    if let Some(signal) = strategy.rebalance_signal() {
        let style = match signal {
            RebalanceSignal::RebalanceRequired => theme::warning(),
            RebalanceSignal::Hold => theme::positive(),
            RebalanceSignal::Other(_) => theme::muted(),
        };
        lines.push(Line::from(vec![
            Span::styled(" Rebalance: ", theme::muted()),
            Span::styled(signal.label().to_string(), style),
        ]));
    }
    lines.push(Line::from(""));

    let primary = strategy.primary();
    let hits = match (kind.supports_bounds(), app.submitted_bounds) {
        (true, Some((min, max))) => primary.bound_hits(min, max),
        _ => Vec::new(),
    };
    allocation(lines, &primary.sorted_allocation(), &hits);
    risk_decomposition(lines, strategy.risk_decomposition());
    drawdown_summary(lines, strategy.drawdowns());

    if let Some(corr) = result.strategy_correlation(kind) {
        correlation(lines, &corr);
    }
}

fn benchmark_details(lines: &mut Vec<Line<'_>>, kind: BenchmarkKind, bench: &BenchmarkResult) {
    lines.push(Line::from(Span::styled(format!(" {}", kind.title()), theme::accent_bold())));
    metrics_header(lines);
    metrics_row(
        lines,
        "Fixed weights",
        &Metrics {
            ret: bench.ret,
            sharpe: bench.sharpe,
            volatility: bench.volatility,
            value_at_risk: bench.value_at_risk,
        },
    );
    lines.push(Line::from(""));
    allocation(lines, &bench.sorted_allocation(), &[]);
    if let Some(rd) = &bench.risk_decomposition {
        risk_decomposition(lines, rd);
    }
    if let Some(worst) = bench.drawdowns.iter().map(|p| p.value).reduce(f64::min) {
        lines.push(Line::from(vec![
            Span::styled(" Max drawdown: ", theme::muted()),
            Span::styled(format!("{worst:.2}%"), theme::negative()),
        ]));
    }
}

fn metrics_header(lines: &mut Vec<Line<'_>>) {
    lines.push(Line::from(Span::styled(
        format!(
            " {:<14} {:>8} {:>8} {:>8} {:>8}",
            "", "Return", "Vol", "Sharpe", "VaR 95"
        ),
        theme::accent_bold(),
    )));
}

fn metrics_row(lines: &mut Vec<Line<'_>>, label: &str, m: &Metrics) {
    let var = m
        .value_at_risk
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "—".to_string());
    lines.push(Line::from(vec![
        Span::styled(format!(" {label:<14} "), theme::muted()),
        Span::styled(format!("{:>7.2}% ", m.ret), theme::signed(m.ret)),
        Span::styled(format!("{:>7.2}% ", m.volatility), theme::text()),
        Span::styled(format!("{:>8.2} ", m.sharpe), theme::sharpe(m.sharpe)),
        Span::styled(format!("{var:>8}"), theme::text()),
    ]));
}

fn allocation(lines: &mut Vec<Line<'_>>, rows: &[(String, f64)], hits: &[String]) {
    lines.push(Line::from(Span::styled(" Allocation", theme::accent_bold())));
    for (ticker, weight) in rows {
        let bar_len = (weight.max(0.0) / 2.5).round() as usize;
        let mark = if hits.contains(ticker) { BOUND_MARK } else { " " };
        lines.push(Line::from(vec![
            Span::styled(format!("  {ticker:<6} {weight:>6.2}% {mark} "), theme::text()),
            Span::styled("█".repeat(bar_len.min(40)), Style::default().fg(theme::ACCENT)),
        ]));
    }
    lines.push(Line::from(""));
}

fn risk_decomposition(lines: &mut Vec<Line<'_>>, rd: &RiskDecomposition) {
    let rows = rd.rows();
    if rows.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        format!(" {:<8} {:>9} {:>9}", "Risk", "Weight", "Risk %"),
        theme::accent_bold(),
    )));
    for (ticker, weight, contribution) in rows {
        lines.push(Line::from(Span::styled(
            format!("  {ticker:<7} {weight:>8.2}% {contribution:>8.2}%"),
            theme::text(),
        )));
    }
    lines.push(Line::from(""));
}

fn drawdown_summary(lines: &mut Vec<Line<'_>>, drawdowns: &[SeriesPoint]) {
    let Some(worst) = drawdowns.iter().min_by(|a, b| a.value.total_cmp(&b.value)) else {
        return;
    };
    lines.push(Line::from(vec![
        Span::styled(" Max drawdown: ", theme::muted()),
        Span::styled(format!("{:.2}%", worst.value), theme::negative()),
        Span::styled(format!(" on {}", worst.date), theme::muted()),
    ]));
    lines.push(Line::from(""));
}

fn correlation(lines: &mut Vec<Line<'_>>, corr: &CorrelationMatrix) {
    if corr.tickers.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(" Correlation", theme::accent_bold())));

    let mut header = format!("  {:<6}", "");
    for t in &corr.tickers {
        header.push_str(&format!(" {t:>6}"));
    }
    lines.push(Line::from(Span::styled(header, theme::muted())));

    for (i, t) in corr.tickers.iter().enumerate() {
        let mut spans = vec![Span::styled(format!("  {t:<6}"), theme::muted())];
        for v in corr.matrix.get(i).map(Vec::as_slice).unwrap_or(&[]) {
            spans.push(Span::styled(format!(" {v:>6.2}"), correlation_style(*v)));
        }
        lines.push(Line::from(spans));
    }
}

fn correlation_style(v: f64) -> Style {
    if v >= 0.7 {
        theme::negative()
    } else if v <= -0.2 {
        theme::positive()
    } else {
        theme::text()
    }
}
