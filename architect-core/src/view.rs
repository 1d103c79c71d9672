//! View controller — the state a dashboard renders from.
//!
//! Holds the active result, its merged comparison table and regime diagnosis,
//! and the selected tab. Submissions are numbered: only the completion for the
//! most recently issued ticket is applied, so a slow response to an older
//! submission can never overwrite a newer one.

use crate::domain::{
    BenchmarkKind, BenchmarkResult, OptimizationResult, PortfolioConfig, StrategyKind,
    StrategyResult,
};
use crate::error::SubmitError;
use crate::merge::{AlignmentPolicy, ComparisonTable, MergeError};
use crate::regime::{classify_regime, RegimeDiagnosis};
use crate::request::{OptimizationRequest, ValidationError};

/// Identifies one submission. Later submissions get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Result tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Strategy(StrategyKind),
    Benchmark(BenchmarkKind),
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Strategy(StrategyKind::RiskParity),
        Tab::Strategy(StrategyKind::MaxSharpe),
        Tab::Strategy(StrategyKind::Hrp),
        Tab::Benchmark(BenchmarkKind::SixtyForty),
        Tab::Benchmark(BenchmarkKind::Permanent),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Strategy(k) => k.label(),
            Tab::Benchmark(k) => k.label(),
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl Default for Tab {
    fn default() -> Self {
        Tab::Strategy(StrategyKind::RiskParity)
    }
}

/// What happened to a completed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer submission was issued; this outcome was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct ViewController {
    phase: Phase,
    sequencer: RequestSequencer,
    policy: AlignmentPolicy,
    result: Option<OptimizationResult>,
    comparison: Option<Result<ComparisonTable, MergeError>>,
    diagnosis: Option<RegimeDiagnosis>,
    active_tab: Tab,
}

impl ViewController {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Validate `config` and, if it is well-formed, start a submission.
    ///
    /// The previous result is cleared either way. On success the controller
    /// enters `Loading` and the caller is handed the ticket and request to
    /// send. On a validation error the controller shows the message and no
    /// ticket is issued.
    pub fn submit(
        &mut self,
        config: &PortfolioConfig,
    ) -> Result<(RequestTicket, OptimizationRequest), ValidationError> {
        self.clear_result();
        match OptimizationRequest::from_config(config) {
            Ok(request) => {
                let ticket = self.sequencer.issue();
                self.phase = Phase::Loading;
                tracing::debug!(seq = ticket.seq(), tickers = request.tickers.len(), "submission started");
                Ok((ticket, request))
            }
            Err(e) => {
                self.phase = Phase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Deliver the outcome of the submission identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<OptimizationResult, SubmitError>,
    ) -> Completion {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(seq = ticket.seq(), "discarding stale response");
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => self.install(result),
            Err(e) => {
                if !e.is_user_error() {
                    tracing::warn!(seq = ticket.seq(), error = %e, "submission failed");
                }
                self.phase = Phase::Failed(e.to_string());
            }
        }
        Completion::Applied
    }

    fn install(&mut self, result: OptimizationResult) {
        let comparison = ComparisonTable::from_result(&result, self.policy);
        if let Err(e) = &comparison {
            tracing::warn!(error = %e, "comparison chart omitted");
        }
        self.comparison = Some(comparison);
        self.diagnosis = Some(classify_regime(result.meta.lookback, result.meta.shrinkage));
        self.result = Some(result);
        self.phase = Phase::Ready;
    }

    fn clear_result(&mut self) {
        self.result = None;
        self.comparison = None;
        self.diagnosis = None;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn latest_ticket(&self) -> Option<RequestTicket> {
        self.sequencer.latest()
    }

    pub fn result(&self) -> Option<&OptimizationResult> {
        self.result.as_ref()
    }

    /// The merged table, or `None` when there is no result or it could not be merged.
    pub fn comparison(&self) -> Option<&ComparisonTable> {
        self.comparison.as_ref()?.as_ref().ok()
    }

    pub fn merge_error(&self) -> Option<&MergeError> {
        self.comparison.as_ref()?.as_ref().err()
    }

    pub fn diagnosis(&self) -> Option<&RegimeDiagnosis> {
        self.diagnosis.as_ref()
    }

    pub fn policy(&self) -> AlignmentPolicy {
        self.policy
    }

    /// Change the alignment policy and re-merge the current result under it.
    pub fn set_policy(&mut self, policy: AlignmentPolicy) {
        self.policy = policy;
        if let Some(result) = &self.result {
            self.comparison = Some(ComparisonTable::from_result(result, policy));
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.active_tab = self.active_tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.active_tab = self.active_tab.prev();
    }

    /// Whether `tab` carries the recommendation badge.
    pub fn shows_badge(&self, tab: Tab) -> bool {
        match (tab, self.diagnosis.as_ref()) {
            (Tab::Strategy(kind), Some(d)) => d.is_recommended(kind),
            _ => false,
        }
    }

    pub fn active_strategy(&self) -> Option<(StrategyKind, &StrategyResult)> {
        match self.active_tab {
            Tab::Strategy(kind) => Some((kind, self.result.as_ref()?.strategy(kind)?)),
            Tab::Benchmark(_) => None,
        }
    }

    pub fn active_benchmark(&self) -> Option<(BenchmarkKind, &BenchmarkResult)> {
        match self.active_tab {
            Tab::Benchmark(kind) => Some((kind, self.result.as_ref()?.benchmark(kind)?)),
            Tab::Strategy(_) => None,
        }
    }
}
