//! Market regime classification
//!
//! Evaluated top-to-bottom, first match wins:
//!
//! 1. StrongTrending: ADX > 25 and no Bollinger squeeze
//! 2. SidewaysRanging: ADX < 20 or squeeze
//! 3. VolatileBreakout: ATR above the volatility threshold
//! 4. WeakTrending: everything else

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, SignalError};

/// Discrete market condition driving the weight profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    StrongTrending,
    SidewaysRanging,
    VolatileBreakout,
    WeakTrending,
}

impl MarketRegime {
    pub const ALL: [MarketRegime; 4] = [
        MarketRegime::StrongTrending,
        MarketRegime::SidewaysRanging,
        MarketRegime::VolatileBreakout,
        MarketRegime::WeakTrending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongTrending => "strong_trending",
            Self::SidewaysRanging => "sideways_ranging",
            Self::VolatileBreakout => "volatile_breakout",
            Self::WeakTrending => "weak_trending",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketRegime {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "strong_trending" | "strongtrending" => Ok(Self::StrongTrending),
            "sideways_ranging" | "sidewaysranging" => Ok(Self::SidewaysRanging),
            "volatile_breakout" | "volatilebreakout" => Ok(Self::VolatileBreakout),
            "weak_trending" | "weaktrending" => Ok(Self::WeakTrending),
            _ => Err(SignalError::UnknownRegime(s.to_string())),
        }
    }
}

/// ADX cut-offs used by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    /// ADX strictly above this (without squeeze) is a strong trend
    pub trending_adx: f64,
    /// ADX strictly below this is a range
    pub ranging_adx: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            trending_adx: 25.0,
            ranging_adx: 20.0,
        }
    }
}

impl RegimeThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.trending_adx.is_finite() && self.ranging_adx.is_finite())
            || self.ranging_adx > self.trending_adx
        {
            return Err(SignalError::InvalidConfig(format!(
                "regime thresholds need ranging_adx <= trending_adx, got {} / {}",
                self.ranging_adx, self.trending_adx
            )));
        }
        Ok(())
    }
}

/// Inputs the classifier needs, all externally computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeInputs {
    pub adx: f64,
    pub bollinger_squeeze: bool,
    pub atr: f64,
    pub volatility_threshold: f64,
}

pub struct RegimeClassifier;

impl RegimeClassifier {
    /// Classify with the default thresholds
    pub fn classify(inputs: &RegimeInputs) -> Result<MarketRegime> {
        Self::classify_with(inputs, &RegimeThresholds::default())
    }

    pub fn classify_with(
        inputs: &RegimeInputs,
        thresholds: &RegimeThresholds,
    ) -> Result<MarketRegime> {
        let adx = ensure_finite("adx", inputs.adx)?;
        let atr = ensure_finite("atr", inputs.atr)?;
        let volatility_threshold =
            ensure_finite("volatility_threshold", inputs.volatility_threshold)?;

        let regime = if adx > thresholds.trending_adx && !inputs.bollinger_squeeze {
            MarketRegime::StrongTrending
        } else if adx < thresholds.ranging_adx || inputs.bollinger_squeeze {
            MarketRegime::SidewaysRanging
        } else if atr > volatility_threshold {
            MarketRegime::VolatileBreakout
        } else {
            MarketRegime::WeakTrending
        };
        Ok(regime)
    }
}
