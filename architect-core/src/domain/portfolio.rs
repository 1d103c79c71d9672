//! Portfolio configuration — the user-editable inputs to an optimization run.

use serde::{Deserialize, Serialize};

/// How the optional leverage target is interpreted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeverageMode {
    /// Annualized volatility target, in percent (15 means 15%).
    #[default]
    #[serde(rename = "volatility")]
    Volatility,
    /// Daily 95% Value-at-Risk target, in percent (1.5 means 1.5%).
    #[serde(rename = "var", alias = "value_at_risk")]
    ValueAtRisk,
}

impl LeverageMode {
    /// Wire name sent to the optimization service.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            LeverageMode::Volatility => "volatility",
            LeverageMode::ValueAtRisk => "var",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeverageMode::Volatility => "Target Volatility (Ann.)",
            LeverageMode::ValueAtRisk => "Target VaR (Daily 95%)",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            LeverageMode::Volatility => LeverageMode::ValueAtRisk,
            LeverageMode::ValueAtRisk => LeverageMode::Volatility,
        }
    }
}

impl std::str::FromStr for LeverageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volatility" | "vol" => Ok(LeverageMode::Volatility),
            "var" | "value_at_risk" | "value-at-risk" => Ok(LeverageMode::ValueAtRisk),
            other => Err(format!("unknown leverage mode '{other}' (expected volatility or var)")),
        }
    }
}

impl std::fmt::Display for LeverageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// The active portfolio configuration.
///
/// `min_weight <= max_weight` is deliberately not checked here; bounds are
/// passed through to the service, which owns their validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub tickers: Vec<String>,
    /// Minimum weight per asset, in percent.
    pub min_weight: f64,
    /// Maximum weight per asset, in percent.
    pub max_weight: f64,
    /// Leverage target; 0 disables leverage.
    pub leverage_target_value: f64,
    pub leverage_target_mode: LeverageMode,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            tickers: ["VTI", "TLT", "GLD", "VNQ"].iter().map(|s| s.to_string()).collect(),
            min_weight: 0.0,
            max_weight: 100.0,
            leverage_target_value: 0.0,
            leverage_target_mode: LeverageMode::Volatility,
        }
    }
}

impl PortfolioConfig {
    /// Tickers rendered back into the comma-separated form the user edits.
    pub fn ticker_text(&self) -> String {
        self.tickers.join(", ")
    }

    pub fn leverage_enabled(&self) -> bool {
        self.leverage_target_value != 0.0
    }

    /// One-line explanation of what the leverage target will do.
    pub fn leverage_description(&self) -> String {
        if !self.leverage_enabled() {
            return "No leverage applied.".to_string();
        }
        let v = self.leverage_target_value;
        match self.leverage_target_mode {
            LeverageMode::Volatility => {
                format!("Scales portfolio to hit {v}% annualized volatility.")
            }
            LeverageMode::ValueAtRisk => format!("Scales portfolio so 95% of days lose < {v}%."),
        }
    }

    /// Apply a partial update. Fields absent from the patch are left untouched.
    pub fn apply(&mut self, patch: &PortfolioPatch) {
        if let Some(tickers) = &patch.tickers {
            self.tickers = tickers.clone();
        }
        if let Some(v) = patch.min_weight {
            self.min_weight = v;
        }
        if let Some(v) = patch.max_weight {
            self.max_weight = v;
        }
        if let Some(v) = patch.leverage_target_value {
            self.leverage_target_value = v;
        }
        if let Some(m) = patch.leverage_target_mode {
            self.leverage_target_mode = m;
        }
    }
}

/// A partial [`PortfolioConfig`]: only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioPatch {
    pub tickers: Option<Vec<String>>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub leverage_target_value: Option<f64>,
    pub leverage_target_mode: Option<LeverageMode>,
}

impl From<&PortfolioConfig> for PortfolioPatch {
    fn from(config: &PortfolioConfig) -> Self {
        Self {
            tickers: Some(config.tickers.clone()),
            min_weight: Some(config.min_weight),
            max_weight: Some(config.max_weight),
            leverage_target_value: Some(config.leverage_target_value),
            leverage_target_mode: Some(config.leverage_target_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_starter_portfolio() {
        let config = PortfolioConfig::default();
        assert_eq!(config.ticker_text(), "VTI, TLT, GLD, VNQ");
        assert_eq!(config.min_weight, 0.0);
        assert_eq!(config.max_weight, 100.0);
        assert!(!config.leverage_enabled());
    }

    #[test]
    fn leverage_descriptions() {
        let mut config = PortfolioConfig::default();
        assert_eq!(config.leverage_description(), "No leverage applied.");

        config.leverage_target_value = 15.0;
        assert_eq!(
            config.leverage_description(),
            "Scales portfolio to hit 15% annualized volatility."
        );

        config.leverage_target_mode = LeverageMode::ValueAtRisk;
        config.leverage_target_value = 1.5;
        assert_eq!(
            config.leverage_description(),
            "Scales portfolio so 95% of days lose < 1.5%."
        );
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut config = PortfolioConfig::default();
        config.leverage_target_value = 12.0;
        let before = config.clone();
        config.apply(&PortfolioPatch::default());
        assert_eq!(config, before);
    }

    #[test]
    fn full_patch_replaces_everything() {
        let target = PortfolioConfig {
            tickers: vec!["SPY".into(), "BND".into()],
            min_weight: 5.0,
            max_weight: 60.0,
            leverage_target_value: 1.2,
            leverage_target_mode: LeverageMode::ValueAtRisk,
        };
        let mut config = PortfolioConfig::default();
        config.apply(&PortfolioPatch::from(&target));
        assert_eq!(config, target);
    }

    #[test]
    fn leverage_mode_wire_names() {
        assert_eq!(serde_json::to_string(&LeverageMode::Volatility).unwrap(), "\"volatility\"");
        assert_eq!(serde_json::to_string(&LeverageMode::ValueAtRisk).unwrap(), "\"var\"");
        assert_eq!("VaR".parse::<LeverageMode>().unwrap(), LeverageMode::ValueAtRisk);
        assert!("leverage".parse::<LeverageMode>().is_err());
    }
}
