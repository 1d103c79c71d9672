//! Domain types: portfolio configuration, strategy identifiers, service results.

pub mod portfolio;
pub mod result;
pub mod strategy;

pub use portfolio::{LeverageMode, PortfolioConfig, PortfolioPatch};
pub use result::{
    price_headers, sorted_allocation, BenchmarkResult, CorrelationMatrix, Diagnostics,
    FrontierMarker, FrontierPoint, Meta, Metrics, OptimizationResult, PriceRow, Rebalance,
    RebalanceSignal, RiskDecomposition, SeriesPoint, StrategyResult, StrategyVariant,
};
pub use strategy::{BenchmarkKind, StrategyKind};
