//! Engine configuration
//!
//! Loaded once at startup and immutable afterwards. Every section has defaults,
//! so an empty JSON object is a valid configuration.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::indicators::registry::{IndicatorSpec, NormalizerRegistry};
use crate::signals::categories::WeightTable;
use crate::signals::confidence::{ConfidenceWeights, RuleThresholds};
use crate::signals::regime::RegimeThresholds;
use crate::signals::scoring::LabelBands;

/// Environment variable naming a JSON configuration file
pub const CONFIG_PATH_ENV: &str = "SUPER_INDICATOR_CONFIG";

/// Deployment environment name (`APP_ENV`), defaulting to `sandbox`
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .or_else(|_| env::var("ENVIRONMENT"))
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: WeightTable,
    pub rules: RuleThresholds,
    pub bands: LabelBands,
    pub regime: RegimeThresholds,
    pub confidence: ConfidenceWeights,
    /// Indicator types registered on top of the default catalogue
    pub indicators: BTreeMap<String, IndicatorSpec>,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the file named by `SUPER_INDICATOR_CONFIG`, or use defaults.
    ///
    /// A `.env` file is read first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                debug!("{} not set, using default engine configuration", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    /// Check every section. Weight profiles fail with `InvalidWeightProfile`.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.rules.validate()?;
        self.bands.validate()?;
        self.regime.validate()?;
        self.confidence.validate()?;
        self.build_registry().map(|_| ())
    }

    /// Default catalogue plus the configured extra indicator types
    pub fn build_registry(&self) -> Result<NormalizerRegistry> {
        let mut registry = NormalizerRegistry::new();
        for (tag, spec) in &self.indicators {
            registry.register(tag.as_str(), *spec)?;
        }
        Ok(registry)
    }
}
