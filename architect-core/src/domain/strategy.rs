//! Strategy and benchmark identifiers.
//!
//! The service keys its response maps by display name ("Risk Parity", "60/40").
//! Everything inside the crate compares these enums instead of the strings.

use serde::{Deserialize, Serialize};

/// An optimized allocation strategy returned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    #[serde(rename = "Risk Parity")]
    RiskParity,
    #[serde(rename = "Max Sharpe")]
    MaxSharpe,
    #[serde(rename = "HRP")]
    Hrp,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] =
        [StrategyKind::RiskParity, StrategyKind::MaxSharpe, StrategyKind::Hrp];

    /// Key used by the service response and the merged comparison table.
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::RiskParity => "Risk Parity",
            StrategyKind::MaxSharpe => "Max Sharpe",
            StrategyKind::Hrp => "HRP",
        }
    }

    /// Card title. HRP ignores weight bounds, which the title makes explicit.
    pub fn title(self) -> &'static str {
        match self {
            StrategyKind::RiskParity => "Risk Parity",
            StrategyKind::MaxSharpe => "Max Sharpe",
            StrategyKind::Hrp => "HRP (Unconstrained Only)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Whether min/max weight bounds apply to this strategy.
    pub fn supports_bounds(self) -> bool {
        !matches!(self, StrategyKind::Hrp)
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A fixed-allocation benchmark portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkKind {
    #[serde(rename = "60/40")]
    SixtyForty,
    #[serde(rename = "Permanent")]
    Permanent,
}

impl BenchmarkKind {
    pub const ALL: [BenchmarkKind; 2] = [BenchmarkKind::SixtyForty, BenchmarkKind::Permanent];

    pub fn label(self) -> &'static str {
        match self {
            BenchmarkKind::SixtyForty => "60/40",
            BenchmarkKind::Permanent => "Permanent",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            BenchmarkKind::SixtyForty => "Classic 60/40",
            BenchmarkKind::Permanent => "Permanent Portfolio",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

impl std::fmt::Display for BenchmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roundtrip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::from_label(kind.label()), Some(kind));
        }
        for kind in BenchmarkKind::ALL {
            assert_eq!(BenchmarkKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(StrategyKind::from_label("HRP (Unconstrained Only)"), None);
    }

    #[test]
    fn serde_uses_service_keys() {
        assert_eq!(serde_json::to_string(&StrategyKind::RiskParity).unwrap(), "\"Risk Parity\"");
        assert_eq!(serde_json::to_string(&BenchmarkKind::SixtyForty).unwrap(), "\"60/40\"");
    }

    #[test]
    fn only_hrp_ignores_bounds() {
        assert!(StrategyKind::RiskParity.supports_bounds());
        assert!(StrategyKind::MaxSharpe.supports_bounds());
        assert!(!StrategyKind::Hrp.supports_bounds());
    }
}
