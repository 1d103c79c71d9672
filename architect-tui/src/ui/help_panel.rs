//! Panel 4 — Help: keyboard shortcuts and the most recent errors.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "1-4", "Switch panel (outside text fields)");
    key(&mut lines, "q / Ctrl+C", "Quit (q outside text fields)");
    key(&mut lines, "Ctrl+S", "Save the form as a preset");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Portfolio");
    key(&mut lines, "↑ / ↓", "Move between fields");
    key(&mut lines, "Enter", "Run the optimization");
    key(&mut lines, "Space", "Toggle leverage target mode");
    key(&mut lines, "Esc", "Jump to saved presets");
    key(&mut lines, "← / →", "Select a preset chip");
    key(&mut lines, "Enter (on chip)", "Load preset into the form");
    key(&mut lines, "s / d (on chip)", "Save / delete preset");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Results");
    key(&mut lines, "← / →", "Switch strategy and benchmark tabs");
    key(&mut lines, "a", "Toggle lenient / strict chart alignment");
    key(&mut lines, "r", "Re-run the optimization");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Chart");
    key(&mut lines, "", "Growth of 100 for every strategy and benchmark");
    key(&mut lines, "a", "Toggle lenient / strict chart alignment");
    lines.push(Line::from(""));

    section(&mut lines, "Reading the results");
    key(&mut lines, "★", "Strategy recommended for the current regime");
    key(&mut lines, "◆", "Weight pinned at the min or max bound");

    if !app.error_history.is_empty() {
        lines.push(Line::from(""));
        section(&mut lines, "Recent errors");
        for record in app.error_history.iter().take(5) {
            key(
                &mut lines,
                &record.timestamp.format("%H:%M:%S").to_string(),
                &record.message,
            );
        }
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>18}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
