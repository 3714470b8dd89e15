//! Prometheus metrics for signal evaluation

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::SignalError;
use crate::models::signal::SignalLabel;

/// Evaluation metrics, registered on a private registry
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub signal_evaluations_total: IntCounter,
    pub signal_evaluation_failures_total: IntCounterVec,
    pub signals_by_label_total: IntCounterVec,
    pub signal_evaluation_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let signal_evaluations_total = IntCounter::with_opts(Opts::new(
            "super_indicator_evaluations_total",
            "Successful signal evaluations",
        ))?;
        let signal_evaluation_failures_total = IntCounterVec::new(
            Opts::new(
                "super_indicator_evaluation_failures_total",
                "Failed signal evaluations by error kind",
            ),
            &["kind"],
        )?;
        let signals_by_label_total = IntCounterVec::new(
            Opts::new("super_indicator_signals_total", "Produced signals by label"),
            &["label"],
        )?;
        let signal_evaluation_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "super_indicator_evaluation_duration_seconds",
                "Time spent in a single evaluation",
            )
            .buckets(vec![0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01]),
        )?;

        registry.register(Box::new(signal_evaluations_total.clone()))?;
        registry.register(Box::new(signal_evaluation_failures_total.clone()))?;
        registry.register(Box::new(signals_by_label_total.clone()))?;
        registry.register(Box::new(signal_evaluation_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            signal_evaluations_total,
            signal_evaluation_failures_total,
            signals_by_label_total,
            signal_evaluation_duration_seconds,
        })
    }

    pub fn record_success(&self, label: SignalLabel, duration_secs: f64) {
        self.signal_evaluations_total.inc();
        self.signals_by_label_total
            .with_label_values(&[label.as_str()])
            .inc();
        self.signal_evaluation_duration_seconds
            .observe(duration_secs);
    }

    pub fn record_failure(&self, error: &SignalError, duration_secs: f64) {
        self.signal_evaluation_failures_total
            .with_label_values(&[error.kind()])
            .inc();
        self.signal_evaluation_duration_seconds
            .observe(duration_secs);
    }

    /// Count a failure that has no meaningful duration (an aborted batch task)
    pub fn record_abort(&self, error: &SignalError) {
        self.signal_evaluation_failures_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("evaluations", &self.signal_evaluations_total.get())
            .finish_non_exhaustive()
    }
}
