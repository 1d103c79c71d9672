//! Optimization service contract.
//!
//! One synchronous round trip: `POST <api_url>/api/optimize` with an
//! [`OptimizationRequest`] body, answered by an [`OptimizationResult`] on
//! success or an `{ "error": "..." }` body otherwise.

use std::time::Instant;

use architect_core::{OptimizationRequest, OptimizationResult, SubmitError};
use serde::Deserialize;

use crate::config::ClientConfig;

/// Anything that can turn a request into a result.
pub trait OptimizerService: Send + Sync {
    fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, SubmitError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// The optimization service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpOptimizer {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpOptimizer {
    pub fn new(config: &ClientConfig) -> Result<Self, SubmitError> {
        // The blocking client defaults to a 30s timeout; None disables it.
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.optimize_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl OptimizerService for HttpOptimizer {
    fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, SubmitError> {
        let started = Instant::now();
        tracing::info!(
            endpoint = %self.endpoint,
            tickers = request.tickers.len(),
            mode = %request.target_mode,
            "sending optimization request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "request failed");
                SubmitError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SubmitError::Transport(format!("failed to read response: {e}")))?;
        tracing::info!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        parse_response(status.as_u16(), status.is_success(), &body)
    }
}

/// Interpret a response from its status and raw body.
pub fn parse_response(
    status: u16,
    success: bool,
    body: &str,
) -> Result<OptimizationResult, SubmitError> {
    if !success {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        return Err(SubmitError::service(status, message));
    }

    serde_json::from_str(body)
        .map_err(|e| SubmitError::Transport(format!("unexpected response body: {e}")))
}
