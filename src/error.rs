//! Error types for signal evaluation and engine configuration.

use thiserror::Error;

/// Errors raised while configuring the engine or evaluating a request.
///
/// Any error aborts the evaluation it occurred in; the engine never falls back
/// to a neutral signal.
#[derive(Debug, Error)]
pub enum SignalError {
    /// A raw value was tagged with an indicator type that has no registered normalizer.
    #[error("Unsupported indicator type '{indicator_type}' for '{name}'")]
    UnsupportedIndicator { name: String, indicator_type: String },

    /// A weight profile does not sum to 1.0 or holds a weight outside [0, 1].
    #[error("Invalid weight profile: {0}")]
    InvalidWeightProfile(String),

    /// A required input is absent from the request.
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// A regime name did not match any known market regime.
    #[error("Unknown market regime: {0}")]
    UnknownRegime(String),

    /// A numeric input was NaN or infinite.
    #[error("Non-finite value for {field}: {value}")]
    NonFiniteInput { field: String, value: f64 },

    /// A batch task ended without producing a result (it panicked or was cancelled).
    #[error("Evaluation of '{symbol}' aborted: {reason}")]
    EvaluationAborted { symbol: String, reason: String },

    /// A configuration value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`crate::config::EngineConfig`].
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SignalError>;

impl SignalError {
    /// Short, stable label for the error kind, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedIndicator { .. } => "unsupported_indicator",
            Self::InvalidWeightProfile(_) => "invalid_weight_profile",
            Self::MissingInput(_) => "missing_input",
            Self::UnknownRegime(_) => "unknown_regime",
            Self::NonFiniteInput { .. } => "non_finite_input",
            Self::EvaluationAborted { .. } => "evaluation_aborted",
            Self::InvalidConfig(_) => "invalid_config",
            Self::ConfigIo(_) => "config_io",
            Self::ConfigParse(_) => "config_parse",
        }
    }
}

/// Reject NaN and infinite inputs before they reach any arithmetic.
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SignalError::NonFiniteInput {
            field: field.to_string(),
            value,
        })
    }
}
