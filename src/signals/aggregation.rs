//! Category-based aggregation logic

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::indicators::registry::{IndicatorCategory, NormalizerRegistry};
use crate::models::indicators::{IndicatorGroup, IndicatorReading, RawIndicator};

/// Aggregate score per category, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub momentum: f64,
    pub trend_momentum: f64,
    pub volatility: f64,
    pub volume: f64,
}

impl CategoryScores {
    pub fn new(momentum: f64, trend_momentum: f64, volatility: f64, volume: f64) -> Self {
        Self {
            momentum,
            trend_momentum,
            volatility,
            volume,
        }
    }

    pub fn get(&self, category: IndicatorCategory) -> f64 {
        match category {
            IndicatorCategory::Momentum => self.momentum,
            IndicatorCategory::TrendMomentum => self.trend_momentum,
            IndicatorCategory::Volatility => self.volatility,
            IndicatorCategory::Volume => self.volume,
        }
    }

    /// Copy with one category replaced
    pub fn with(mut self, category: IndicatorCategory, score: f64) -> Self {
        match category {
            IndicatorCategory::Momentum => self.momentum = score,
            IndicatorCategory::TrendMomentum => self.trend_momentum = score,
            IndicatorCategory::Volatility => self.volatility = score,
            IndicatorCategory::Volume => self.volume = score,
        }
        self
    }

    /// Scores in [`IndicatorCategory::ALL`] order
    pub fn as_array(&self) -> [f64; 4] {
        [self.momentum, self.trend_momentum, self.volatility, self.volume]
    }
}

/// The four indicator groups of one evaluation
#[derive(Debug, Clone)]
pub struct CategoryGroups {
    groups: [IndicatorGroup; 4],
}

impl CategoryGroups {
    pub fn get(&self, category: IndicatorCategory) -> &IndicatorGroup {
        &self.groups[category.index()]
    }

    pub fn scores(&self) -> CategoryScores {
        CategoryScores::new(
            self.groups[0].score(),
            self.groups[1].score(),
            self.groups[2].score(),
            self.groups[3].score(),
        )
    }

    pub fn readings(&self) -> impl Iterator<Item = &IndicatorReading> {
        self.groups.iter().flat_map(|g| g.readings().iter())
    }
}

pub struct Aggregator;

impl Aggregator {
    /// Normalize every raw value. Fails on the first unsupported or non-finite one.
    pub fn normalize_all(
        registry: &NormalizerRegistry,
        values: &BTreeMap<String, RawIndicator>,
    ) -> Result<Vec<IndicatorReading>> {
        values
            .iter()
            .map(|(name, raw)| registry.read(name, raw))
            .collect()
    }

    /// Aggregate readings into the four category groups
    pub fn group_by_category(readings: Vec<IndicatorReading>) -> Result<CategoryGroups> {
        let mut buckets: BTreeMap<IndicatorCategory, Vec<IndicatorReading>> = BTreeMap::new();
        for reading in readings {
            buckets.entry(reading.category).or_default().push(reading);
        }

        let mut build = |category: IndicatorCategory| -> Result<IndicatorGroup> {
            let members = buckets.remove(&category).unwrap_or_default();
            IndicatorGroup::new(category, members).ok_or_else(|| {
                SignalError::MissingInput(format!("no indicators in category {}", category))
            })
        };

        Ok(CategoryGroups {
            groups: [
                build(IndicatorCategory::Momentum)?,
                build(IndicatorCategory::TrendMomentum)?,
                build(IndicatorCategory::Volatility)?,
                build(IndicatorCategory::Volume)?,
            ],
        })
    }
}
