//! Adaptive multi-indicator signal aggregation.
//!
//! Takes already computed indicator values plus regime inputs and produces a
//! single [`CompositeSignal`] with a bounded score, label and confidence.
//! Evaluation is pure and performs no I/O.

pub mod config;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod signals;

pub use config::EngineConfig;
pub use error::{Result, SignalError};
pub use models::{CompositeSignal, EvaluationRequest, SignalLabel};
pub use signals::{MarketRegime, SuperIndicator};
