//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod request;
pub mod signal;

pub use indicators::{IndicatorGroup, IndicatorReading, RawIndicator};
pub use request::EvaluationRequest;
pub use signal::{CategoryBreakdown, CompositeSignal, SignalBreakdown, SignalLabel};
