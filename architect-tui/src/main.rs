//! Portfolio Architect TUI — terminal dashboard for the portfolio optimizer.
//!
//! Panels:
//! 1. Portfolio — tickers, weight bounds, leverage target, saved presets
//! 2. Results — regime diagnosis, strategy and benchmark tabs
//! 3. Chart — combined growth-of-100 comparison
//! 4. Help — keyboard shortcuts

mod app;
mod input;
mod theme;
mod ui;
mod worker;

#[cfg(test)]
mod test_helpers;

use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use architect_client::config::default_data_dir;
use architect_client::{ClientConfig, HttpOptimizer, OptimizerService};
use architect_core::{FileBackend, PresetStore};

use crate::app::AppState;
use crate::worker::WorkerCommand;

const LOG_FILE: &str = "architect-tui.log";

/// Log to a file so the terminal is never written to.
fn init_tracing(log_level: &str, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_path = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let config = ClientConfig::load(config_path.as_deref()).context("invalid configuration")?;
    init_tracing(&config.log_level, &default_data_dir())?;
    tracing::info!(
        endpoint = %config.optimize_url(),
        alignment = %config.alignment,
        timeout_secs = ?config.timeout_secs,
        "starting dashboard"
    );

    let service: Arc<dyn OptimizerService> = Arc::new(HttpOptimizer::new(&config)?);
    let presets = PresetStore::open(FileBackend::in_dir(config.resolved_presets_dir()));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, service)
        .context("failed to spawn worker thread")?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, presets, config.alignment);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("dashboard closed");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        app.poll_worker();

        // 50ms poll keeps the UI at ~20 FPS while a request is in flight.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
