//! Panel 1 — Portfolio: tickers, weight bounds, leverage target, presets.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, FormField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let form = &app.form;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "  [↑/↓]field [Enter]optimize [Space]mode [Ctrl+S]save preset",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    for field in FormField::ALL {
        if field == FormField::Presets {
            continue;
        }
        let focused = form.focus == field;
        let label_style = if focused {
            theme::accent_bold()
        } else {
            theme::muted()
        };
        let mut value = form.display(field);
        if focused && field.is_text() {
            value.push('▏');
        }
        let value_style = if focused {
            theme::selected()
        } else {
            theme::text()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>16}  ", field.label()), label_style),
            Span::styled(value, value_style),
        ]));

        if field == FormField::TargetMode {
            let description = match form.to_config() {
                Ok(config) => config.leverage_description(),
                Err(msg) => msg,
            };
            lines.push(Line::from(Span::styled(
                format!("  {:>16}  {description}", ""),
                theme::muted(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(preset_chips(app));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn preset_chips(app: &AppState) -> Line<'static> {
    let focused = app.form.focus == FormField::Presets;
    let label_style = if focused {
        theme::accent_bold()
    } else {
        theme::muted()
    };
    let mut spans = vec![Span::styled(
        format!("  {:>16}  ", FormField::Presets.label()),
        label_style,
    )];

    let presets = app.presets.presets();
    if presets.is_empty() {
        spans.push(Span::styled("(none)", theme::muted()));
        return Line::from(spans);
    }

    for (i, preset) in presets.iter().enumerate() {
        let style = if focused && i == app.form.preset_cursor {
            theme::selected()
        } else {
            theme::accent()
        };
        spans.push(Span::styled(format!("[{}]", preset.name), style));
        spans.push(Span::raw(" "));
    }
    if focused {
        spans.push(Span::styled(
            " [←/→]select [Enter]load [d]elete",
            theme::muted(),
        ));
    }
    Line::from(spans)
}
