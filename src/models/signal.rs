use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::models::indicators::IndicatorReading;
use crate::signals::regime::MarketRegime;

/// Discrete trading label derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalLabel {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl SignalLabel {
    pub const ALL: [SignalLabel; 5] = [
        SignalLabel::StrongSell,
        SignalLabel::Sell,
        SignalLabel::Hold,
        SignalLabel::Buy,
        SignalLabel::StrongBuy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongSell => "STRONG_SELL",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
            Self::Buy => "BUY",
            Self::StrongBuy => "STRONG_BUY",
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalLabel {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == key || label.as_str().replace('_', "") == key)
            .ok_or_else(|| SignalError::InvalidConfig(format!("unknown signal label '{}'", s)))
    }
}

/// Score, weight and weighted contribution of one category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
}

impl CategoryBreakdown {
    pub fn new(score: f64, weight: f64) -> Self {
        Self {
            score,
            weight,
            contribution: score * weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub momentum: CategoryBreakdown,
    pub trend: CategoryBreakdown,
    pub volatility: CategoryBreakdown,
    pub volume: CategoryBreakdown,
}

impl SignalBreakdown {
    /// Sum of contributions, equal to the composite score
    pub fn total_contribution(&self) -> f64 {
        self.momentum.contribution
            + self.trend.contribution
            + self.volatility.contribution
            + self.volume.contribution
    }
}

/// Final output of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub symbol: String,
    pub timeframe: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "signal")]
    pub label: SignalLabel,
    pub confidence: f64,
    pub confidence_multiplier: f64,
    /// Names of the confidence rules that fired, in registration order
    pub applied_rules: Vec<String>,
    pub score: f64,
    #[serde(rename = "market_condition")]
    pub regime: MarketRegime,
    pub breakdown: SignalBreakdown,
    pub individual_indicators: BTreeMap<String, IndicatorReading>,
}

impl CompositeSignal {
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
