//! Color tokens and shared styles.

use ratatui::style::{Color, Modifier, Style};

use architect_core::domain::{BenchmarkKind, StrategyKind};
use architect_core::merge::ComparisonSeries;

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn selected() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn panel_border() -> Style {
    accent()
}

pub fn panel_title() -> Style {
    accent_bold()
}

/// Green for gains, pink for losses.
pub fn signed(value: f64) -> Style {
    if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

pub fn sharpe(value: f64) -> Style {
    match value {
        s if s >= 1.0 => positive(),
        s if s >= 0.5 => accent(),
        s if s >= 0.0 => Style::default().fg(NEUTRAL),
        _ => negative(),
    }
}

/// Line color of each series on the comparison chart.
pub fn series_color(series: ComparisonSeries) -> Color {
    match series {
        ComparisonSeries::Strategy(StrategyKind::RiskParity) => ACCENT,
        ComparisonSeries::Strategy(StrategyKind::MaxSharpe) => POSITIVE,
        ComparisonSeries::Strategy(StrategyKind::Hrp) => NEUTRAL,
        ComparisonSeries::Benchmark(BenchmarkKind::SixtyForty) => WARNING,
        ComparisonSeries::Benchmark(BenchmarkKind::Permanent) => Color::Gray,
    }
}
