use serde::{Deserialize, Serialize};

use crate::indicators::registry::IndicatorCategory;

/// An externally computed indicator value, tagged with its indicator type.
///
/// The tag selects the normalizer; the map key it is stored under in a request is
/// the reading's display name, so several readings may share one tag
/// (e.g. `rsi_14` and `rsi_7` both tagged `rsi`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndicator {
    pub indicator_type: String,
    pub value: f64,
}

impl RawIndicator {
    pub fn new(indicator_type: impl Into<String>, value: f64) -> Self {
        Self {
            indicator_type: indicator_type.into(),
            value,
        }
    }
}

/// A raw indicator value after normalization onto the [0, 100] scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub name: String,
    pub indicator_type: String,
    pub category: IndicatorCategory,
    pub raw_value: f64,
    /// 0 = fully bearish, 50 = neutral, 100 = fully bullish.
    pub normalized_score: f64,
    /// Informational reliability rank (1 = most reliable).
    pub tier: u8,
}

/// Readings of one category together with their mean score.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorGroup {
    pub category: IndicatorCategory,
    readings: Vec<IndicatorReading>,
    score: f64,
}

impl IndicatorGroup {
    /// Build a group from its member readings. Returns `None` for an empty set.
    pub fn new(category: IndicatorCategory, readings: Vec<IndicatorReading>) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        let score =
            readings.iter().map(|r| r.normalized_score).sum::<f64>() / readings.len() as f64;
        Some(Self {
            category,
            readings,
            score,
        })
    }

    /// Arithmetic mean of member normalized scores.
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn readings(&self) -> &[IndicatorReading] {
        &self.readings
    }
}
