//! Category weight profiles, one per market regime

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::indicators::registry::IndicatorCategory;
use crate::signals::regime::MarketRegime;

/// Allowed deviation of a profile's weight sum from 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Category weights for a single regime.
///
/// [`WeightProfile::new`] rejects invalid weights; a deserialized profile is
/// checked by [`WeightTable::validate`] before any engine can use it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightProfile {
    momentum: f64,
    #[serde(alias = "trend")]
    trend_momentum: f64,
    volatility: f64,
    volume: f64,
}

impl WeightProfile {
    pub fn new(momentum: f64, trend_momentum: f64, volatility: f64, volume: f64) -> Result<Self> {
        let profile = Self {
            momentum,
            trend_momentum,
            volatility,
            volume,
        };
        profile.check()?;
        Ok(profile)
    }

    /// Every weight in [0, 1] and the sum within [`WEIGHT_TOLERANCE`] of 1.0
    pub fn check(&self) -> Result<()> {
        let weights = [
            ("momentum", self.momentum),
            ("trend_momentum", self.trend_momentum),
            ("volatility", self.volatility),
            ("volume", self.volume),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(SignalError::InvalidWeightProfile(format!(
                    "{} weight must be in [0, 1], got {}",
                    name, weight
                )));
            }
        }

        let total = self.sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SignalError::InvalidWeightProfile(format!(
                "weights must sum to 1.0, got {}",
                total
            )));
        }
        Ok(())
    }

    /// Get weight for a category
    pub fn get(&self, category: IndicatorCategory) -> f64 {
        match category {
            IndicatorCategory::Momentum => self.momentum,
            IndicatorCategory::TrendMomentum => self.trend_momentum,
            IndicatorCategory::Volatility => self.volatility,
            IndicatorCategory::Volume => self.volume,
        }
    }

    pub fn sum(&self) -> f64 {
        self.momentum + self.trend_momentum + self.volatility + self.volume
    }

    /// Weights in [`IndicatorCategory::ALL`] order
    pub fn as_array(&self) -> [f64; 4] {
        [self.momentum, self.trend_momentum, self.volatility, self.volume]
    }
}

fn profile(momentum: f64, trend_momentum: f64, volatility: f64, volume: f64) -> WeightProfile {
    WeightProfile {
        momentum,
        trend_momentum,
        volatility,
        volume,
    }
}

/// Regime → weight profile lookup, total over [`MarketRegime`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTable {
    strong_trending: WeightProfile,
    sideways_ranging: WeightProfile,
    volatile_breakout: WeightProfile,
    weak_trending: WeightProfile,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            strong_trending: profile(0.25, 0.50, 0.20, 0.05),
            sideways_ranging: profile(0.50, 0.15, 0.30, 0.05),
            volatile_breakout: profile(0.30, 0.35, 0.25, 0.10),
            weak_trending: profile(0.40, 0.25, 0.30, 0.05),
        }
    }
}

impl WeightTable {
    pub fn new(
        strong_trending: WeightProfile,
        sideways_ranging: WeightProfile,
        volatile_breakout: WeightProfile,
        weak_trending: WeightProfile,
    ) -> Self {
        Self {
            strong_trending,
            sideways_ranging,
            volatile_breakout,
            weak_trending,
        }
    }

    /// Replace the profile for one regime
    pub fn with_profile(mut self, regime: MarketRegime, profile: WeightProfile) -> Self {
        match regime {
            MarketRegime::StrongTrending => self.strong_trending = profile,
            MarketRegime::SidewaysRanging => self.sideways_ranging = profile,
            MarketRegime::VolatileBreakout => self.volatile_breakout = profile,
            MarketRegime::WeakTrending => self.weak_trending = profile,
        }
        self
    }

    pub fn profile(&self, regime: MarketRegime) -> &WeightProfile {
        match regime {
            MarketRegime::StrongTrending => &self.strong_trending,
            MarketRegime::SidewaysRanging => &self.sideways_ranging,
            MarketRegime::VolatileBreakout => &self.volatile_breakout,
            MarketRegime::WeakTrending => &self.weak_trending,
        }
    }

    /// Look up a profile by regime name
    pub fn profile_by_name(&self, regime: &str) -> Result<&WeightProfile> {
        Ok(self.profile(regime.parse()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MarketRegime, &WeightProfile)> + '_ {
        MarketRegime::ALL
            .into_iter()
            .map(move |regime| (regime, self.profile(regime)))
    }

    /// Check every profile; run once at configuration load
    pub fn validate(&self) -> Result<()> {
        for (regime, profile) in self.iter() {
            profile.check().map_err(|e| match e {
                SignalError::InvalidWeightProfile(reason) => {
                    SignalError::InvalidWeightProfile(format!("{}: {}", regime, reason))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
