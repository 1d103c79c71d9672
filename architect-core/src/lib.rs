//! Portfolio Architect core — domain types and the logic every front end shares.
//!
//! This crate is free of I/O except for the preset file backend:
//! - Domain types for the portfolio configuration and the service response
//! - Request building and validation
//! - Date-keyed merging of strategy and benchmark histories for the comparison chart
//! - Regime classification and the single canonical strategy recommendation
//! - Named preset storage behind a pluggable backend
//! - The view controller that sequences submissions and discards stale responses

pub mod domain;
pub mod error;
pub mod merge;
pub mod preset;
pub mod regime;
pub mod request;
pub mod view;

pub use domain::{
    BenchmarkKind, BenchmarkResult, LeverageMode, OptimizationResult, PortfolioConfig,
    PortfolioPatch, StrategyKind, StrategyResult,
};
pub use error::SubmitError;
pub use merge::{AlignmentPolicy, ComparisonSeries, ComparisonTable, MergeError};
pub use preset::{FileBackend, MemoryBackend, PresetBackend, PresetError, PresetStore, SavedPreset};
pub use regime::{classify_regime, RegimeDiagnosis};
pub use request::{build_request, OptimizationRequest, ValidationError};
pub use view::{Completion, Phase, RequestTicket, Tab, ViewController};
