//! Panel 3 — Chart: growth of 100 for every strategy and benchmark on one
//! date axis, from the merged comparison table.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use architect_core::merge::ComparisonSeries;
use architect_core::ComparisonTable;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let view = &app.view;
    match (view.comparison(), view.merge_error()) {
        (Some(table), _) if !table.is_empty() => render_chart(f, area, table, app),
        (_, Some(err)) => render_message(
            f,
            area,
            &format!("Comparison chart unavailable: {err}"),
            "Press 'a' to switch alignment policy.",
        ),
        _ => render_message(
            f,
            area,
            "No comparison data yet.",
            "Run an optimization from the Portfolio panel (press 1).",
        ),
    }
}

fn render_message(f: &mut Frame, area: Rect, headline: &str, hint: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(headline.to_string(), theme::warning())),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_chart(f: &mut Frame, area: Rect, table: &ComparisonTable, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let series = table.present_series();
    let data: Vec<(ComparisonSeries, Vec<(f64, f64)>)> =
        series.iter().map(|&s| (s, table.points(s))).collect();

    let mut legend = vec![Span::styled(
        format!(" alignment: {} ", app.view.policy()),
        theme::muted(),
    )];
    for (s, _) in &data {
        let gaps = table.gaps(*s);
        let label = if gaps > 0 {
            format!("■ {} ({gaps} gaps) ", s.label())
        } else {
            format!("■ {} ", s.label())
        };
        legend.push(Span::styled(label, Style::default().fg(theme::series_color(*s))));
    }
    f.render_widget(Paragraph::new(Line::from(legend)), chunks[0]);

    let datasets: Vec<Dataset> = data
        .iter()
        .map(|(s, points)| {
            Dataset::default()
                .name(s.label())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(theme::series_color(*s)))
                .graph_type(GraphType::Line)
                .data(points)
        })
        .collect();

    let (y_min, y_max) = table.value_bounds().unwrap_or((0.0, 1.0));
    let padding = ((y_max - y_min).abs() * 0.05).max(0.5);
    let y_min = y_min - padding;
    let y_max = y_max + padding;
    let x_max = table.len().saturating_sub(1) as f64;

    let first = table.rows.first().map(|r| r.date.to_string()).unwrap_or_default();
    let last = table.rows.last().map(|r| r.date.to_string()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Growth of 100", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), theme::muted()),
                    Span::styled(format!("{y_max:.0}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, chunks[1]);
}
