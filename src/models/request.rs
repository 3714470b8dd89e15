use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SignalError};
use crate::models::indicators::RawIndicator;
use crate::signals::regime::RegimeInputs;

/// Everything one evaluation consumes.
///
/// Regime inputs are optional at the type level so that a request decoded from an
/// external source can be rejected with [`SignalError::MissingInput`] instead of
/// silently defaulting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: String,
    /// Stamped on the output; `None` means "now". Supply it for replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub indicator_values: BTreeMap<String, RawIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger_squeeze: Option<bool>,
    #[serde(default)]
    pub volume_confirmation: bool,
    /// Bollinger %B position, 0 = lower band, 1 = upper band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bb_position: Option<f64>,
}

impl EvaluationRequest {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
            timestamp: None,
            indicator_values: BTreeMap::new(),
            adx: None,
            atr: None,
            volatility_threshold: None,
            bollinger_squeeze: None,
            volume_confirmation: false,
            bb_position: None,
        }
    }

    pub fn with_indicator(
        mut self,
        name: impl Into<String>,
        indicator_type: impl Into<String>,
        value: f64,
    ) -> Self {
        self.indicator_values
            .insert(name.into(), RawIndicator::new(indicator_type, value));
        self
    }

    pub fn with_regime_inputs(
        mut self,
        adx: f64,
        atr: f64,
        volatility_threshold: f64,
        bollinger_squeeze: bool,
    ) -> Self {
        self.adx = Some(adx);
        self.atr = Some(atr);
        self.volatility_threshold = Some(volatility_threshold);
        self.bollinger_squeeze = Some(bollinger_squeeze);
        self
    }

    pub fn with_bb_position(mut self, bb_position: f64) -> Self {
        self.bb_position = Some(bb_position);
        self
    }

    pub fn with_volume_confirmation(mut self, confirmed: bool) -> Self {
        self.volume_confirmation = confirmed;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Collect the classifier inputs, failing on the first absent one
    pub fn regime_inputs(&self) -> Result<RegimeInputs> {
        fn required<T: Copy>(value: Option<T>, field: &str) -> Result<T> {
            value.ok_or_else(|| SignalError::MissingInput(field.to_string()))
        }

        Ok(RegimeInputs {
            adx: required(self.adx, "adx")?,
            bollinger_squeeze: required(self.bollinger_squeeze, "bollinger_squeeze")?,
            atr: required(self.atr, "atr")?,
            volatility_threshold: required(self.volatility_threshold, "volatility_threshold")?,
        })
    }
}
