//! Confidence rules and the final confidence calculation
//!
//! Rules are `{predicate, multiplier}` records. Every rule is evaluated and the
//! multipliers of those that hold are multiplied together, then capped.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::signals::aggregation::CategoryScores;
use crate::signals::regime::MarketRegime;

/// Auxiliary inputs the rules look at besides the category scores.
///
/// Absent values make any predicate that needs them false.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AuxiliarySignals {
    pub rsi: Option<f64>,
    pub stochastic: Option<f64>,
    pub adx: Option<f64>,
    /// MACD value relative to its signal line; only the sign matters
    pub macd: Option<f64>,
    pub bb_position: Option<f64>,
    pub volume_confirmation: bool,
}

/// What a rule predicate can see
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub scores: &'a CategoryScores,
    pub regime: MarketRegime,
    pub aux: &'a AuxiliarySignals,
}

pub type RulePredicate = Arc<dyn Fn(&RuleContext<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ConfidenceRule {
    name: String,
    multiplier: f64,
    predicate: RulePredicate,
}

impl fmt::Debug for ConfidenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidenceRule")
            .field("name", &self.name)
            .field("multiplier", &self.multiplier)
            .finish_non_exhaustive()
    }
}

impl ConfidenceRule {
    pub fn new<F>(name: impl Into<String>, multiplier: f64, predicate: F) -> Result<Self>
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        if !multiplier.is_finite() || multiplier <= 1.0 {
            return Err(SignalError::InvalidConfig(format!(
                "rule '{}' multiplier must be > 1.0, got {}",
                name, multiplier
            )));
        }
        Ok(Self {
            name,
            multiplier,
            predicate: Arc::new(predicate),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        (self.predicate)(ctx)
    }

    /// RSI and Stochastic within `max_delta` of each other
    pub fn momentum_agreement(max_delta: f64, boost: f64) -> Result<Self> {
        Self::new("momentum_agreement", boost, move |ctx| {
            match (ctx.aux.rsi, ctx.aux.stochastic) {
                (Some(rsi), Some(stoch)) => (rsi - stoch).abs() < max_delta,
                _ => false,
            }
        })
    }

    /// Strong trend with a positive MACD
    pub fn trend_alignment(adx_threshold: f64, boost: f64) -> Result<Self> {
        Self::new("trend_alignment", boost, move |ctx| {
            ctx.regime == MarketRegime::StrongTrending
                && ctx.aux.adx.is_some_and(|adx| adx > adx_threshold)
                && ctx.aux.macd.is_some_and(|macd| macd > 0.0)
        })
    }

    pub fn volume_confirmation(boost: f64) -> Result<Self> {
        Self::new("volume_confirmation", boost, |ctx| ctx.aux.volume_confirmation)
    }

    /// Price at a band extreme confirmed by RSI on the same side
    pub fn extreme_alignment(thresholds: &RuleThresholds) -> Result<Self> {
        let RuleThresholds {
            extreme_low_band,
            extreme_high_band,
            oversold_rsi,
            overbought_rsi,
            extreme_alignment_boost,
            ..
        } = *thresholds;

        Self::new("extreme_alignment", extreme_alignment_boost, move |ctx| {
            match (ctx.aux.bb_position, ctx.aux.rsi) {
                (Some(bb), Some(rsi)) => {
                    (bb < extreme_low_band && rsi < oversold_rsi)
                        || (bb > extreme_high_band && rsi > overbought_rsi)
                }
                _ => false,
            }
        })
    }
}

/// Thresholds and boost factors of the built-in rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub agreement_delta: f64,
    pub trend_adx_threshold: f64,
    pub momentum_agreement_boost: f64,
    pub trend_alignment_boost: f64,
    pub volume_confirmation_boost: f64,
    pub extreme_alignment_boost: f64,
    pub extreme_low_band: f64,
    pub extreme_high_band: f64,
    pub oversold_rsi: f64,
    pub overbought_rsi: f64,
    pub max_multiplier: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            agreement_delta: 10.0,
            trend_adx_threshold: 25.0,
            momentum_agreement_boost: 1.2,
            trend_alignment_boost: 1.3,
            volume_confirmation_boost: 1.1,
            extreme_alignment_boost: 1.25,
            extreme_low_band: 0.2,
            extreme_high_band: 0.8,
            oversold_rsi: 30.0,
            overbought_rsi: 70.0,
            max_multiplier: 1.5,
        }
    }
}

impl RuleThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.agreement_delta.is_finite() && self.agreement_delta > 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "agreement_delta must be positive, got {}",
                self.agreement_delta
            )));
        }
        if !(self.max_multiplier.is_finite() && self.max_multiplier >= 1.0) {
            return Err(SignalError::InvalidConfig(format!(
                "max_multiplier must be >= 1.0, got {}",
                self.max_multiplier
            )));
        }
        if !(self.extreme_low_band < self.extreme_high_band
            && self.oversold_rsi < self.overbought_rsi)
        {
            return Err(SignalError::InvalidConfig(
                "extreme thresholds must satisfy low < high for both %B and RSI".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of running the rule set
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBoost {
    pub multiplier: f64,
    pub applied: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConfidenceFilter {
    rules: Vec<ConfidenceRule>,
    max_multiplier: f64,
}

impl ConfidenceFilter {
    /// Filter with no rules
    pub fn new(max_multiplier: f64) -> Result<Self> {
        if !(max_multiplier.is_finite() && max_multiplier >= 1.0) {
            return Err(SignalError::InvalidConfig(format!(
                "max_multiplier must be >= 1.0, got {}",
                max_multiplier
            )));
        }
        Ok(Self {
            rules: Vec::new(),
            max_multiplier,
        })
    }

    /// Filter with the four built-in rules
    pub fn from_thresholds(thresholds: &RuleThresholds) -> Result<Self> {
        thresholds.validate()?;
        let mut filter = Self::new(thresholds.max_multiplier)?;
        filter.register(ConfidenceRule::momentum_agreement(
            thresholds.agreement_delta,
            thresholds.momentum_agreement_boost,
        )?);
        filter.register(ConfidenceRule::trend_alignment(
            thresholds.trend_adx_threshold,
            thresholds.trend_alignment_boost,
        )?);
        filter.register(ConfidenceRule::volume_confirmation(
            thresholds.volume_confirmation_boost,
        )?);
        filter.register(ConfidenceRule::extreme_alignment(thresholds)?);
        Ok(filter)
    }

    pub fn register(&mut self, rule: ConfidenceRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[ConfidenceRule] {
        &self.rules
    }

    pub fn max_multiplier(&self) -> f64 {
        self.max_multiplier
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> ConfidenceBoost {
        let mut multiplier = 1.0;
        let mut applied = Vec::new();
        for rule in &self.rules {
            if rule.applies(ctx) {
                multiplier *= rule.multiplier();
                applied.push(rule.name().to_string());
            }
        }
        ConfidenceBoost {
            multiplier: multiplier.min(self.max_multiplier),
            applied,
        }
    }
}

/// Weights of the three base confidence components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub score: f64,
    pub agreement: f64,
    pub volume: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            score: 0.5,
            agreement: 0.3,
            volume: 0.2,
        }
    }
}

impl ConfidenceWeights {
    pub fn validate(&self) -> Result<()> {
        let parts = [self.score, self.agreement, self.volume];
        let total: f64 = parts.iter().sum();
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) || (total - 1.0).abs() > 1e-6 {
            return Err(SignalError::InvalidConfig(format!(
                "confidence weights must be non-negative and sum to 1.0, got {}/{}/{}",
                self.score, self.agreement, self.volume
            )));
        }
        Ok(())
    }
}

pub struct ConfidenceCalculator;

impl ConfidenceCalculator {
    /// Distance of the composite from neutral, in [0, 1]
    pub fn score_confidence(composite: f64) -> f64 {
        ((composite - 50.0).abs() / 50.0).clamp(0.0, 1.0)
    }

    /// 1 minus the normalized population standard deviation of the category scores.
    ///
    /// 50 is the largest standard deviation values in [0, 100] can have.
    pub fn agreement_confidence(scores: &CategoryScores) -> f64 {
        let values = scores.as_array();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (1.0 - variance.sqrt() / 50.0).clamp(0.0, 1.0)
    }

    pub fn volume_confidence(volume_score: f64) -> f64 {
        (volume_score / 100.0).clamp(0.0, 1.0)
    }

    pub fn base_confidence(
        composite: f64,
        scores: &CategoryScores,
        weights: &ConfidenceWeights,
    ) -> f64 {
        weights.score * Self::score_confidence(composite)
            + weights.agreement * Self::agreement_confidence(scores)
            + weights.volume * Self::volume_confidence(scores.volume)
    }

    /// `min(base * multiplier, 1.0)`
    pub fn final_confidence(base: f64, multiplier: f64) -> f64 {
        (base * multiplier).clamp(0.0, 1.0)
    }
}
