//! Regime classifier and recommender.
//!
//! A pure function of the two scalars the service reports: the lookback it
//! settled on and the covariance shrinkage it applied. Every recommendation
//! badge in the front ends comes from [`RegimeDiagnosis::recommended`], so the
//! banner and the tabs cannot disagree.

use serde::{Deserialize, Serialize};

use crate::domain::StrategyKind;

/// Lookback (trading days) at or above which trends count as long-term.
pub const LONG_TERM_DAYS: u32 = 252;
/// Lookback at or above which trends count as medium-term.
pub const MEDIUM_TERM_DAYS: u32 = 126;
/// Shrinkage below which correlations are considered clear.
pub const CLEAR_SHRINKAGE: f64 = 0.2;
/// Shrinkage at or above which the market is considered chaotic.
pub const CHAOTIC_SHRINKAGE: f64 = 0.5;
/// Shrinkage above which HRP is recommended regardless of lookback.
pub const HRP_SHRINKAGE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    LongTermStable,
    MediumTermDominant,
    RecentShift,
}

impl Timeframe {
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::LongTermStable => "long-term stable",
            Timeframe::MediumTermDominant => "medium-term dominant",
            Timeframe::RecentShift => "recent-shift / history unreliable",
        }
    }

    pub fn sentence(self) -> &'static str {
        match self {
            Timeframe::LongTermStable => "Long-term trends are stable.",
            Timeframe::MediumTermDominant => "Medium-term trends are dominant.",
            Timeframe::RecentShift => "Recent shifts have made history obsolete.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Noise {
    Clear,
    Moderate,
    Chaotic,
}

impl Noise {
    pub fn label(self) -> &'static str {
        match self {
            Noise::Clear => "clear",
            Noise::Moderate => "moderate",
            Noise::Chaotic => "chaotic/high-correlation",
        }
    }

    pub fn sentence(self) -> &'static str {
        match self {
            Noise::Clear => "Correlations are clear.",
            Noise::Moderate => "Market noise is moderate.",
            Noise::Chaotic => "Market is chaotic/highly correlated.",
        }
    }
}

/// Classification of the current market regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeDiagnosis {
    pub lookback_days: u32,
    pub shrinkage: f64,
    pub timeframe: Timeframe,
    pub noise: Noise,
    pub is_stable: bool,
    pub recommended: StrategyKind,
}

impl RegimeDiagnosis {
    pub fn title(&self) -> &'static str {
        if self.lookback_days >= LONG_TERM_DAYS {
            "Stable Regime"
        } else {
            "Transitional Regime"
        }
    }

    pub fn description(&self) -> String {
        format!("{} {}", self.timeframe.sentence(), self.noise.sentence())
    }

    pub fn implication(&self) -> &'static str {
        if self.shrinkage < CHAOTIC_SHRINKAGE {
            "High confidence."
        } else {
            "Aggressive dampening applied."
        }
    }

    pub fn is_recommended(&self, kind: StrategyKind) -> bool {
        self.recommended == kind
    }
}

/// Classify a regime from the service's lookback and shrinkage.
///
/// Total over every input: a NaN shrinkage falls through every `<` comparison
/// and is treated as chaotic, but never as HRP-worthy (`>` is false too).
pub fn classify_regime(lookback_days: u32, shrinkage: f64) -> RegimeDiagnosis {
    let timeframe = if lookback_days >= LONG_TERM_DAYS {
        Timeframe::LongTermStable
    } else if lookback_days >= MEDIUM_TERM_DAYS {
        Timeframe::MediumTermDominant
    } else {
        Timeframe::RecentShift
    };

    let noise = if shrinkage < CLEAR_SHRINKAGE {
        Noise::Clear
    } else if shrinkage < CHAOTIC_SHRINKAGE {
        Noise::Moderate
    } else {
        Noise::Chaotic
    };

    RegimeDiagnosis {
        lookback_days,
        shrinkage,
        timeframe,
        noise,
        is_stable: lookback_days >= LONG_TERM_DAYS && shrinkage < CHAOTIC_SHRINKAGE,
        recommended: recommend(lookback_days, shrinkage),
    }
}

fn recommend(lookback_days: u32, shrinkage: f64) -> StrategyKind {
    if shrinkage > HRP_SHRINKAGE {
        StrategyKind::Hrp
    } else if lookback_days < LONG_TERM_DAYS {
        StrategyKind::RiskParity
    } else {
        StrategyKind::MaxSharpe
    }
}
