//! Keyboard input dispatch — global keys, then panel-specific handlers.
//!
//! The form takes typed characters, so single-letter global shortcuts are only
//! live outside its text fields; Ctrl+C always quits and Ctrl+S always saves.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, FormField, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.running = false,
            KeyCode::Char('s') => app.save_preset(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.active_panel = app.active_panel.next();
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        _ => {}
    }

    let typing = app.active_panel == Panel::Form && app.form.focus.is_text();
    if !typing {
        match key.code {
            KeyCode::Char('q') => {
                app.running = false;
                return;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                app.active_panel = Panel::ALL[index];
                return;
            }
            _ => {}
        }
    }

    match app.active_panel {
        Panel::Form => handle_form_key(app, key),
        Panel::Results => handle_results_key(app, key),
        Panel::Chart => handle_chart_key(app, key),
        Panel::Help => {}
    }
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up => {
            app.form.focus = app.form.focus.prev();
            return;
        }
        KeyCode::Down => {
            app.form.focus = app.form.focus.next();
            return;
        }
        KeyCode::Esc => {
            app.form.focus = FormField::Presets;
            return;
        }
        _ => {}
    }

    match app.form.focus {
        FormField::TargetMode => match key.code {
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                app.form.target_mode = app.form.target_mode.toggle();
            }
            KeyCode::Enter => app.submit(),
            _ => {}
        },
        FormField::Presets => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.move_preset_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => app.move_preset_cursor(1),
            KeyCode::Enter => app.load_selected_preset(),
            KeyCode::Char('d') => app.delete_selected_preset(),
            KeyCode::Char('s') => app.save_preset(),
            KeyCode::Char('r') => app.submit(),
            _ => {}
        },
        FormField::PresetName => match key.code {
            KeyCode::Enter => app.save_preset(),
            _ => edit_text(app, key),
        },
        _ => match key.code {
            KeyCode::Enter => app.submit(),
            _ => edit_text(app, key),
        },
    }
}

fn edit_text(app: &mut AppState, key: KeyEvent) {
    let Some(text) = app.form.focused_text_mut() else {
        return;
    };
    match key.code {
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(c) => text.push(c),
        _ => {}
    }
}

fn handle_results_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Right | KeyCode::Char('l') => app.view.next_tab(),
        KeyCode::Left | KeyCode::Char('h') => app.view.prev_tab(),
        KeyCode::Char('a') => app.toggle_alignment(),
        KeyCode::Char('r') => app.submit(),
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Char('a') {
        app.toggle_alignment();
    }
}
