//! Indicator registry keyed by indicator-type tag

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, SignalError};
use crate::indicators::normalizer::Transform;
use crate::models::indicators::{IndicatorReading, RawIndicator};

/// Indicator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Momentum,
    TrendMomentum,
    Volatility,
    Volume,
}

impl IndicatorCategory {
    pub const ALL: [IndicatorCategory; 4] = [
        IndicatorCategory::Momentum,
        IndicatorCategory::TrendMomentum,
        IndicatorCategory::Volatility,
        IndicatorCategory::Volume,
    ];

    /// Position of this category in [`IndicatorCategory::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::Momentum => 0,
            Self::TrendMomentum => 1,
            Self::Volatility => 2,
            Self::Volume => 3,
        }
    }

    /// Key used for this category in the serialized breakdown
    pub fn breakdown_key(&self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::TrendMomentum => "trend",
            Self::Volatility => "volatility",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for IndicatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Momentum => write!(f, "Momentum"),
            Self::TrendMomentum => write!(f, "TrendMomentum"),
            Self::Volatility => write!(f, "Volatility"),
            Self::Volume => write!(f, "Volume"),
        }
    }
}

/// How a registered indicator type is categorized and normalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub category: IndicatorCategory,
    pub tier: u8,
    pub transform: Transform,
}

impl IndicatorSpec {
    pub const fn new(category: IndicatorCategory, tier: u8, transform: Transform) -> Self {
        Self {
            category,
            tier,
            transform,
        }
    }
}

/// Registry of normalizers, one per indicator-type tag.
///
/// Tags are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct NormalizerRegistry {
    specs: HashMap<String, IndicatorSpec>,
}

impl NormalizerRegistry {
    /// Registry with no indicator types
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Registry preloaded with the default indicator catalogue
    pub fn new() -> Self {
        use IndicatorCategory::*;
        use Transform::*;

        let defaults = [
            ("rsi", IndicatorSpec::new(Momentum, 1, Oscillator)),
            ("stochastic", IndicatorSpec::new(Momentum, 1, Oscillator)),
            ("williams_r", IndicatorSpec::new(Momentum, 2, Range { min: -100.0, max: 0.0 })),
            ("cci", IndicatorSpec::new(Momentum, 2, Signed { scale: 0.25 })),
            ("roc", IndicatorSpec::new(Momentum, 3, Signed { scale: 5.0 })),
            ("macd", IndicatorSpec::new(TrendMomentum, 1, Signed { scale: 25.0 })),
            ("adx_di", IndicatorSpec::new(TrendMomentum, 1, Signed { scale: 1.0 })),
            ("ema_cross", IndicatorSpec::new(TrendMomentum, 2, Signed { scale: 10.0 })),
            ("supertrend", IndicatorSpec::new(TrendMomentum, 2, Signed { scale: 50.0 })),
            ("bollinger", IndicatorSpec::new(Volatility, 1, BandPosition)),
            ("keltner", IndicatorSpec::new(Volatility, 2, BandPosition)),
            ("donchian", IndicatorSpec::new(Volatility, 3, BandPosition)),
            ("vwap", IndicatorSpec::new(Volume, 1, Signed { scale: 10.0 })),
            ("mfi", IndicatorSpec::new(Volume, 1, Oscillator)),
            ("cmf", IndicatorSpec::new(Volume, 2, Signed { scale: 50.0 })),
            ("obv", IndicatorSpec::new(Volume, 3, Signed { scale: 10.0 })),
        ];

        Self {
            specs: defaults
                .into_iter()
                .map(|(tag, spec)| (tag.to_string(), spec))
                .collect(),
        }
    }

    /// Register (or replace) the normalizer for an indicator type
    pub fn register(&mut self, tag: impl Into<String>, spec: IndicatorSpec) -> Result<()> {
        let tag = tag.into().to_ascii_lowercase();
        if tag.is_empty() {
            return Err(SignalError::InvalidConfig(
                "indicator type tag must not be empty".to_string(),
            ));
        }
        if !(1..=3).contains(&spec.tier) {
            return Err(SignalError::InvalidConfig(format!(
                "tier for '{}' must be 1, 2 or 3, got {}",
                tag, spec.tier
            )));
        }
        spec.transform.validate()?;
        self.specs.insert(tag, spec);
        Ok(())
    }

    pub fn get(&self, indicator_type: &str) -> Option<&IndicatorSpec> {
        self.specs.get(&indicator_type.to_ascii_lowercase())
    }

    pub fn contains(&self, indicator_type: &str) -> bool {
        self.get(indicator_type).is_some()
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Normalize a raw value for the given indicator type
    pub fn normalize(&self, raw_value: f64, indicator_type: &str) -> Result<f64> {
        let spec = self
            .get(indicator_type)
            .ok_or_else(|| SignalError::UnsupportedIndicator {
                name: indicator_type.to_string(),
                indicator_type: indicator_type.to_string(),
            })?;
        let raw_value = ensure_finite(indicator_type, raw_value)?;
        ensure_finite(indicator_type, spec.transform.apply(raw_value))
    }

    /// Turn a named raw value into a reading
    pub fn read(&self, name: &str, raw: &RawIndicator) -> Result<IndicatorReading> {
        let spec = self
            .get(&raw.indicator_type)
            .ok_or_else(|| SignalError::UnsupportedIndicator {
                name: name.to_string(),
                indicator_type: raw.indicator_type.clone(),
            })?;
        let raw_value = ensure_finite(name, raw.value)?;
        let normalized_score = ensure_finite(name, spec.transform.apply(raw_value))?;

        Ok(IndicatorReading {
            name: name.to_string(),
            indicator_type: raw.indicator_type.to_ascii_lowercase(),
            category: spec.category,
            raw_value,
            normalized_score,
            tier: spec.tier,
        })
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
