//! Request builder and validator.
//!
//! Turns the free-text ticker box plus the numeric constraints into the JSON
//! body posted to `/api/optimize`. Validation happens here, before any network
//! call; numeric bounds are passed through unmodified.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LeverageMode, PortfolioConfig};

/// Minimum number of distinct tickers an optimization needs.
pub const MIN_TICKERS: usize = 2;

/// Bad user input, caught before a request is issued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please enter at least two tickers.")]
    InsufficientTickers { found: usize },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// Body of `POST /api/optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub tickers: Vec<String>,
    pub min_weight: f64,
    pub max_weight: f64,
    pub target_value: f64,
    pub target_mode: LeverageMode,
}

impl OptimizationRequest {
    /// Build a request from the active configuration.
    pub fn from_config(config: &PortfolioConfig) -> Result<Self, ValidationError> {
        build_request(
            &config.ticker_text(),
            config.min_weight,
            config.max_weight,
            config.leverage_target_value,
            config.leverage_target_mode,
        )
    }
}

/// Split on commas, trim, upper-case, drop empty tokens. Order and duplicates
/// are preserved.
pub fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Reject NaN and infinite weights or leverage targets. JSON cannot carry
/// them, so they would reach the service or a preset file as `null`.
pub fn check_finite(
    min_weight: f64,
    max_weight: f64,
    target_value: f64,
) -> Result<(), ValidationError> {
    for (field, value) in [
        ("min_weight", min_weight),
        ("max_weight", max_weight),
        ("target_value", target_value),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
    }
    Ok(())
}

/// Validate raw form input and shape it into an [`OptimizationRequest`].
pub fn build_request(
    raw_tickers: &str,
    min_weight: f64,
    max_weight: f64,
    target_value: f64,
    target_mode: LeverageMode,
) -> Result<OptimizationRequest, ValidationError> {
    let tickers = parse_tickers(raw_tickers);

    let distinct = tickers.iter().collect::<HashSet<_>>().len();
    if distinct < MIN_TICKERS {
        tracing::debug!(found = distinct, "rejected request: not enough tickers");
        return Err(ValidationError::InsufficientTickers { found: distinct });
    }

    check_finite(min_weight, max_weight, target_value)?;

    Ok(OptimizationRequest {
        tickers,
        min_weight,
        max_weight,
        target_value,
        target_mode,
    })
}
