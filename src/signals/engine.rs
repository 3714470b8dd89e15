//! Main signal evaluation engine.
//!
//! Pipeline per request: classify regime, normalize and group readings, pick the
//! regime's weight profile, compose score and label, run confidence rules,
//! compute confidence, assemble the output. Holds only immutable configuration,
//! so one engine can be shared behind an `Arc` by any number of threads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::error::{ensure_finite, Result, SignalError};
use crate::indicators::registry::NormalizerRegistry;
use crate::metrics::Metrics;
use crate::models::indicators::IndicatorReading;
use crate::models::request::EvaluationRequest;
use crate::models::signal::CompositeSignal;
use crate::signals::aggregation::{Aggregator, CategoryGroups};
use crate::signals::assembler::{OutputAssembler, SignalParts};
use crate::signals::categories::WeightTable;
use crate::signals::confidence::{
    AuxiliarySignals, ConfidenceCalculator, ConfidenceFilter, ConfidenceRule, ConfidenceWeights,
    RuleContext,
};
use crate::signals::regime::{RegimeClassifier, RegimeThresholds};
use crate::signals::scoring::{LabelBands, SignalComposer};

#[derive(Debug, Clone)]
pub struct SuperIndicator {
    registry: NormalizerRegistry,
    weights: WeightTable,
    filter: ConfidenceFilter,
    bands: LabelBands,
    regime_thresholds: RegimeThresholds,
    confidence_weights: ConfidenceWeights,
    metrics: Option<Arc<Metrics>>,
}

impl SuperIndicator {
    /// Build an engine from a configuration, validating it first
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: config.build_registry()?,
            weights: config.weights,
            filter: ConfidenceFilter::from_thresholds(&config.rules)?,
            bands: config.bands,
            regime_thresholds: config.regime,
            confidence_weights: config.confidence,
            metrics: None,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Add a confidence rule after the built-in ones
    pub fn with_rule(mut self, rule: ConfidenceRule) -> Self {
        self.filter.register(rule);
        self
    }

    pub fn registry(&self) -> &NormalizerRegistry {
        &self.registry
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn filter(&self) -> &ConfidenceFilter {
        &self.filter
    }

    pub fn bands(&self) -> &LabelBands {
        &self.bands
    }

    /// Evaluate one request. Errors abort the whole evaluation.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<CompositeSignal> {
        let start = Instant::now();
        let result = self.run_pipeline(request);
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(signal) => {
                debug!(
                    symbol = %signal.symbol,
                    regime = %signal.regime,
                    score = signal.score,
                    label = %signal.label,
                    confidence = signal.confidence,
                    "Evaluated {}: {} (score {:.2}, confidence {:.2})",
                    signal.symbol,
                    signal.label,
                    signal.score,
                    signal.confidence
                );
                if let Some(ref metrics) = self.metrics {
                    metrics.record_success(signal.label, elapsed);
                }
            }
            Err(e) => {
                warn!(
                    symbol = %request.symbol,
                    error = %e,
                    kind = e.kind(),
                    "Evaluation failed for {}",
                    request.symbol
                );
                if let Some(ref metrics) = self.metrics {
                    metrics.record_failure(e, elapsed);
                }
            }
        }

        result
    }

    fn run_pipeline(&self, request: &EvaluationRequest) -> Result<CompositeSignal> {
        let regime_inputs = request.regime_inputs()?;
        let regime = RegimeClassifier::classify_with(&regime_inputs, &self.regime_thresholds)?;

        let readings = Aggregator::normalize_all(&self.registry, &request.indicator_values)?;
        let groups = Aggregator::group_by_category(readings)?;
        let scores = groups.scores();

        let profile = self.weights.profile(regime);
        let (score, label) = SignalComposer::compose(&scores, profile, &self.bands);

        let aux = Self::auxiliary_signals(request, &groups)?;
        let boost = self.filter.evaluate(&RuleContext {
            scores: &scores,
            regime,
            aux: &aux,
        });

        let base = ConfidenceCalculator::base_confidence(score, &scores, &self.confidence_weights);
        let confidence = ConfidenceCalculator::final_confidence(base, boost.multiplier);

        debug!(
            symbol = %request.symbol,
            regime = %regime,
            momentum = scores.momentum,
            trend = scores.trend_momentum,
            volatility = scores.volatility,
            volume = scores.volume,
            multiplier = boost.multiplier,
            rules = ?boost.applied,
            "Pipeline stages complete for {}",
            request.symbol
        );

        Ok(OutputAssembler::assemble(SignalParts {
            symbol: &request.symbol,
            timeframe: &request.timeframe,
            timestamp: request.timestamp.unwrap_or_else(Utc::now),
            regime,
            groups: &groups,
            profile,
            score,
            label,
            confidence,
            boost,
        }))
    }

    /// Pull the rule inputs out of the request and the normalized readings.
    ///
    /// RSI, Stochastic and MACD come from the first reading (by name) of the
    /// matching indicator type.
    fn auxiliary_signals(
        request: &EvaluationRequest,
        groups: &CategoryGroups,
    ) -> Result<AuxiliarySignals> {
        let raw_of = |indicator_type: &str| {
            let mut matches: Vec<&IndicatorReading> = groups
                .readings()
                .filter(|r| r.indicator_type == indicator_type)
                .collect();
            matches.sort_by(|a, b| a.name.cmp(&b.name));
            matches.first().map(|r| r.raw_value)
        };

        let bb_position = request
            .bb_position
            .map(|bb| ensure_finite("bb_position", bb))
            .transpose()?;

        Ok(AuxiliarySignals {
            rsi: raw_of("rsi"),
            stochastic: raw_of("stochastic"),
            adx: request.adx,
            macd: raw_of("macd"),
            bb_position,
            volume_confirmation: request.volume_confirmation,
        })
    }

    /// Evaluate many requests as independent blocking tasks.
    ///
    /// Results are keyed by symbol. When several requests share a symbol only the
    /// first in input order is evaluated. A task that panics yields
    /// [`SignalError::EvaluationAborted`] for its symbol.
    pub async fn evaluate_batch(
        self: Arc<Self>,
        requests: Vec<EvaluationRequest>,
    ) -> HashMap<String, Result<CompositeSignal>> {
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<task::Id, String> = HashMap::with_capacity(requests.len());
        let mut seen = HashSet::with_capacity(requests.len());

        for request in requests {
            if !seen.insert(request.symbol.clone()) {
                warn!(
                    symbol = %request.symbol,
                    "Skipping duplicate request for {} in batch",
                    request.symbol
                );
                continue;
            }
            let symbol = request.symbol.clone();
            let engine = Arc::clone(&self);
            let handle = tasks.spawn_blocking(move || engine.evaluate(&request));
            pending.insert(handle.id(), symbol);
        }

        let mut results = HashMap::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, result)) => {
                    if let Some(symbol) = pending.remove(&id) {
                        results.insert(symbol, result);
                    }
                }
                Err(e) => {
                    let Some(symbol) = pending.remove(&e.id()) else {
                        error!(error = %e, "Evaluation task for unknown request failed");
                        continue;
                    };
                    let reason = if e.is_panic() {
                        "evaluation panicked".to_string()
                    } else {
                        e.to_string()
                    };
                    error!(symbol = %symbol, error = %e, "Evaluation task for {} failed", symbol);
                    let err = SignalError::EvaluationAborted {
                        symbol: symbol.clone(),
                        reason,
                    };
                    if let Some(ref metrics) = self.metrics {
                        metrics.record_abort(&err);
                    }
                    results.insert(symbol, Err(err));
                }
            }
        }

        debug!(count = results.len(), "Batch evaluation finished");
        results
    }
}
