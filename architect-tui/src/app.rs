//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use architect_core::domain::{LeverageMode, PortfolioConfig, PortfolioPatch};
use architect_core::preset::apply_preset;
use architect_core::request::parse_tickers;
use architect_core::{AlignmentPolicy, Completion, PresetStore, ViewController};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Form,
    Results,
    Chart,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Form, Panel::Results, Panel::Chart, Panel::Help];

    pub fn index(self) -> usize {
        match self {
            Panel::Form => 0,
            Panel::Results => 1,
            Panel::Chart => 2,
            Panel::Help => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Form => "Portfolio",
            Panel::Results => "Results",
            Panel::Chart => "Chart",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::ALL[(self.index() + 1) % Panel::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Panel::ALL[(self.index() + Panel::ALL.len() - 1) % Panel::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

/// Rows of the form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Tickers,
    MinWeight,
    MaxWeight,
    TargetValue,
    TargetMode,
    PresetName,
    Presets,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Tickers,
        FormField::MinWeight,
        FormField::MaxWeight,
        FormField::TargetValue,
        FormField::TargetMode,
        FormField::PresetName,
        FormField::Presets,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Tickers => "Tickers",
            FormField::MinWeight => "Min weight %",
            FormField::MaxWeight => "Max weight %",
            FormField::TargetValue => "Leverage target",
            FormField::TargetMode => "Target mode",
            FormField::PresetName => "Preset name",
            FormField::Presets => "Saved",
        }
    }

    /// Whether the field takes typed characters.
    pub fn is_text(self) -> bool {
        !matches!(self, FormField::TargetMode | FormField::Presets)
    }

    fn position(self) -> usize {
        FormField::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> FormField {
        FormField::ALL[(self.position() + 1) % FormField::ALL.len()]
    }

    pub fn prev(self) -> FormField {
        FormField::ALL[(self.position() + FormField::ALL.len() - 1) % FormField::ALL.len()]
    }
}

/// Editable form: numbers are kept as the text the user typed.
#[derive(Debug, Clone)]
pub struct FormState {
    pub tickers: String,
    pub min_weight: String,
    pub max_weight: String,
    pub target_value: String,
    pub target_mode: LeverageMode,
    pub preset_name: String,
    pub focus: FormField,
    pub preset_cursor: usize,
}

impl FormState {
    pub fn from_config(config: &PortfolioConfig) -> Self {
        Self {
            tickers: config.ticker_text(),
            min_weight: format_number(config.min_weight),
            max_weight: format_number(config.max_weight),
            target_value: format_number(config.leverage_target_value),
            target_mode: config.leverage_target_mode,
            preset_name: String::new(),
            focus: FormField::Tickers,
            preset_cursor: 0,
        }
    }

    /// The configuration the form currently describes.
    pub fn to_config(&self) -> Result<PortfolioConfig, String> {
        Ok(PortfolioConfig {
            tickers: parse_tickers(&self.tickers),
            min_weight: parse_number(FormField::MinWeight, &self.min_weight)?,
            max_weight: parse_number(FormField::MaxWeight, &self.max_weight)?,
            leverage_target_value: parse_number(FormField::TargetValue, &self.target_value)?,
            leverage_target_mode: self.target_mode,
        })
    }

    /// Overwrite only the fields the patch carries.
    pub fn apply(&mut self, patch: &PortfolioPatch) {
        if let Some(tickers) = &patch.tickers {
            self.tickers = tickers.join(", ");
        }
        if let Some(v) = patch.min_weight {
            self.min_weight = format_number(v);
        }
        if let Some(v) = patch.max_weight {
            self.max_weight = format_number(v);
        }
        if let Some(v) = patch.leverage_target_value {
            self.target_value = format_number(v);
        }
        if let Some(mode) = patch.leverage_target_mode {
            self.target_mode = mode;
        }
    }

    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Tickers => Some(&mut self.tickers),
            FormField::MinWeight => Some(&mut self.min_weight),
            FormField::MaxWeight => Some(&mut self.max_weight),
            FormField::TargetValue => Some(&mut self.target_value),
            FormField::PresetName => Some(&mut self.preset_name),
            FormField::TargetMode | FormField::Presets => None,
        }
    }

    /// Text shown for a field.
    pub fn display(&self, field: FormField) -> String {
        match field {
            FormField::Tickers => self.tickers.clone(),
            FormField::MinWeight => self.min_weight.clone(),
            FormField::MaxWeight => self.max_weight.clone(),
            FormField::TargetValue => self.target_value.clone(),
            FormField::TargetMode => self.target_mode.label().to_string(),
            FormField::PresetName => self.preset_name.clone(),
            FormField::Presets => String::new(),
        }
    }
}

fn format_number(v: f64) -> String {
    format!("{v}")
}

fn parse_number(field: FormField, raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number.", field.label()))
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub form: FormState,
    pub view: ViewController,
    pub presets: PresetStore,
    /// Bounds of the request whose result is on screen, for bound-hit flags.
    pub submitted_bounds: Option<(f64, f64)>,
    pending_bounds: Option<(f64, f64)>,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        presets: PresetStore,
        policy: AlignmentPolicy,
    ) -> Self {
        Self {
            active_panel: Panel::Form,
            running: true,
            form: FormState::from_config(&PortfolioConfig::default()),
            view: ViewController::new(policy),
            presets,
            submitted_bounds: None,
            pending_bounds: None,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
        }
    }

    pub fn push_error(&mut self, message: String) {
        self.error_history.push_front(ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            message: message.clone(),
        });
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Validate the form and hand the request to the worker.
    pub fn submit(&mut self) {
        let config = match self.form.to_config() {
            Ok(c) => c,
            Err(msg) => {
                self.push_error(msg);
                return;
            }
        };

        match self.view.submit(&config) {
            Ok((ticket, request)) => {
                self.pending_bounds = Some((request.min_weight, request.max_weight));
                if self
                    .worker_tx
                    .send(WorkerCommand::Optimize { ticket, request })
                    .is_err()
                {
                    self.push_error("Background worker is not running.".into());
                    return;
                }
                self.set_status(format!("Optimizing {} tickers...", config.tickers.len()));
            }
            Err(e) => self.push_error(e.to_string()),
        }
    }

    /// Drain worker responses without blocking.
    pub fn poll_worker(&mut self) {
        while let Ok(resp) = self.worker_rx.try_recv() {
            self.handle_response(resp);
        }
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Completed { ticket, outcome } => {
                match self.view.complete(ticket, *outcome) {
                    Completion::Stale => {
                        self.set_warning(format!("Ignored stale response #{}", ticket.seq()));
                    }
                    Completion::Applied => self.after_completion(),
                }
            }
        }
    }

    fn after_completion(&mut self) {
        if let Some(msg) = self.view.error_message().map(str::to_string) {
            self.push_error(msg);
            return;
        }

        self.submitted_bounds = self.pending_bounds.take();
        if let Some(err) = self.view.merge_error() {
            self.set_warning(format!("Comparison chart unavailable: {err}"));
        } else if let Some(d) = self.view.diagnosis() {
            self.set_status(format!(
                "{} | lookback {}d, shrinkage {:.2} | recommended: {}",
                d.title(),
                d.lookback_days,
                d.shrinkage,
                d.recommended.label()
            ));
        }
    }

    pub fn toggle_alignment(&mut self) {
        let next = match self.view.policy() {
            AlignmentPolicy::Lenient => AlignmentPolicy::Strict,
            AlignmentPolicy::Strict => AlignmentPolicy::Lenient,
        };
        self.view.set_policy(next);
        match self.view.merge_error() {
            Some(err) => self.set_warning(format!("Alignment {next}: {err}")),
            None => self.set_status(format!("Alignment {next}")),
        }
    }

    pub fn save_preset(&mut self) {
        let config = match self.form.to_config() {
            Ok(c) => c,
            Err(msg) => {
                self.push_error(msg);
                return;
            }
        };
        match self.presets.save(&self.form.preset_name, &config) {
            Ok(saved) => {
                self.form.preset_name.clear();
                self.form.preset_cursor = self.presets.len().saturating_sub(1);
                self.set_status(format!("Saved preset '{}'", saved.name));
            }
            Err(e) => self.push_error(format!("Could not save preset: {e}")),
        }
    }

    pub fn load_selected_preset(&mut self) {
        match self.presets.get(self.form.preset_cursor) {
            Some(preset) => {
                self.form.apply(&apply_preset(&preset));
                self.set_status(format!("Loaded preset '{}'", preset.name));
            }
            None => self.set_warning("No saved presets."),
        }
    }

    pub fn delete_selected_preset(&mut self) {
        match self.presets.delete_at(self.form.preset_cursor) {
            Ok(removed) => {
                let len = self.presets.len();
                if self.form.preset_cursor >= len {
                    self.form.preset_cursor = len.saturating_sub(1);
                }
                self.set_status(format!("Deleted preset '{}'", removed.name));
            }
            Err(e) => self.set_warning(e.to_string()),
        }
    }

    pub fn move_preset_cursor(&mut self, delta: isize) {
        let len = self.presets.len();
        if len == 0 {
            self.form.preset_cursor = 0;
            return;
        }
        let current = self.form.preset_cursor.min(len - 1) as isize;
        self.form.preset_cursor = (current + delta).rem_euclid(len as isize) as usize;
    }
}
