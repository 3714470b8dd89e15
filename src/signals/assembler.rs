//! Builds the externally visible [`CompositeSignal`]

use chrono::{DateTime, Utc};

use crate::indicators::registry::IndicatorCategory;
use crate::models::signal::{CategoryBreakdown, CompositeSignal, SignalBreakdown, SignalLabel};
use crate::signals::aggregation::CategoryGroups;
use crate::signals::categories::WeightProfile;
use crate::signals::confidence::ConfidenceBoost;
use crate::signals::regime::MarketRegime;

/// Intermediate results of one evaluation, handed to the assembler
#[derive(Debug)]
pub struct SignalParts<'a> {
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub timestamp: DateTime<Utc>,
    pub regime: MarketRegime,
    pub groups: &'a CategoryGroups,
    pub profile: &'a WeightProfile,
    pub score: f64,
    pub label: SignalLabel,
    pub confidence: f64,
    pub boost: ConfidenceBoost,
}

pub struct OutputAssembler;

impl OutputAssembler {
    pub fn assemble(parts: SignalParts<'_>) -> CompositeSignal {
        let scores = parts.groups.scores();
        let entry = |category: IndicatorCategory| {
            CategoryBreakdown::new(scores.get(category), parts.profile.get(category))
        };

        let breakdown = SignalBreakdown {
            momentum: entry(IndicatorCategory::Momentum),
            trend: entry(IndicatorCategory::TrendMomentum),
            volatility: entry(IndicatorCategory::Volatility),
            volume: entry(IndicatorCategory::Volume),
        };

        let individual_indicators = parts
            .groups
            .readings()
            .map(|reading| (reading.name.clone(), reading.clone()))
            .collect();

        CompositeSignal {
            symbol: parts.symbol.to_string(),
            timeframe: parts.timeframe.to_string(),
            timestamp: parts.timestamp,
            label: parts.label,
            confidence: parts.confidence,
            confidence_multiplier: parts.boost.multiplier,
            applied_rules: parts.boost.applied,
            score: parts.score,
            regime: parts.regime,
            breakdown,
            individual_indicators,
        }
    }
}
