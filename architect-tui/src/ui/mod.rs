//! Top-level UI layout — one panel at a time above a status bar.

pub mod chart_panel;
pub mod form_panel;
pub mod help_panel;
pub mod results_panel;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_panel(f, chunks[0], app);
    status_bar::render(f, chunks[1], app);
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border())
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title());

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Form => form_panel::render(f, inner, app),
        Panel::Results => results_panel::render(f, inner, app),
        Panel::Chart => chart_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{make_app, sample_result};
    use crate::worker::{WorkerCommand, WorkerResponse};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn every_panel_renders_before_and_after_a_result() {
        let (mut app, cmd_rx, resp_tx) = make_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();

        for panel in Panel::ALL {
            app.active_panel = panel;
            terminal.draw(|f| draw(f, &app)).unwrap();
        }

        app.submit();
        let Ok(WorkerCommand::Optimize { ticket, .. }) = cmd_rx.try_recv() else {
            panic!("expected an optimize command");
        };
        resp_tx
            .send(WorkerResponse::Completed {
                ticket,
                outcome: Box::new(Ok(sample_result())),
            })
            .unwrap();
        app.poll_worker();

        for panel in Panel::ALL {
            app.active_panel = panel;
            terminal.draw(|f| draw(f, &app)).unwrap();
        }

        app.active_panel = Panel::Results;
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Stable Regime"));
        assert!(text.contains("Allocation"));
    }
}
