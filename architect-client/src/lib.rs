//! Portfolio Architect client — everything between the core and the network.
//!
//! - Client configuration (TOML file plus `ARCHITECT_*` environment overrides)
//! - The optimization service contract and its HTTP implementation
//! - Blocking submission through a [`ViewController`](architect_core::ViewController)
//! - CSV and JSON export of results

pub mod config;
pub mod export;
pub mod service;
pub mod submit;

pub use config::{ClientConfig, ConfigError};
pub use service::{HttpOptimizer, OptimizerService};
pub use submit::submit_blocking;
