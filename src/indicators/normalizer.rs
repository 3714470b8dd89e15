//! Score normalization onto the unified 0 (bearish) .. 100 (bullish) scale

use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};

/// Neutral point of the normalized scale
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Normalize an already bounded 0-100 oscillator (RSI, Stochastic, MFI)
pub fn normalize_oscillator(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Map `value` linearly from [min, max] onto [0, 100]
///
/// Williams %R for instance lives in [-100, 0].
pub fn normalize_range(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return NEUTRAL_SCORE;
    }
    ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

/// Normalize a signed momentum/trend value centered on zero
///
/// `50 + clamp(value * scale, -50, 50)`
pub fn normalize_signed(value: f64, scale: f64) -> f64 {
    NEUTRAL_SCORE + (value * scale).clamp(-50.0, 50.0)
}

/// Normalize a band position in [0, 1] (Bollinger %B, Keltner, Donchian)
pub fn normalize_band_position(position: f64) -> f64 {
    position.clamp(0.0, 1.0) * 100.0
}

/// Per-indicator transform onto the normalized scale.
///
/// Every variant is monotonically non-decreasing in its input once validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    Oscillator,
    Range { min: f64, max: f64 },
    Signed { scale: f64 },
    BandPosition,
}

impl Transform {
    pub fn apply(&self, raw: f64) -> f64 {
        match *self {
            Self::Oscillator => normalize_oscillator(raw),
            Self::Range { min, max } => normalize_range(raw, min, max),
            Self::Signed { scale } => normalize_signed(raw, scale),
            Self::BandPosition => normalize_band_position(raw),
        }
    }

    /// Reject parameters that would break boundedness or monotonicity.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Range { min, max }
                if !(min.is_finite() && max.is_finite() && min < max && (max - min).is_finite()) =>
            {
                Err(SignalError::InvalidConfig(format!(
                    "range transform needs finite min < max with a finite width, got [{}, {}]",
                    min, max
                )))
            }
            Self::Signed { scale } if !(scale.is_finite() && scale > 0.0) => {
                Err(SignalError::InvalidConfig(format!(
                    "signed transform needs a positive finite scale, got {}",
                    scale
                )))
            }
            _ => Ok(()),
        }
    }
}
