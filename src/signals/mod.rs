//! Signal aggregation pipeline.

pub mod aggregation;
pub mod assembler;
pub mod categories;
pub mod confidence;
pub mod engine;
pub mod regime;
pub mod scoring;

pub use aggregation::*;
pub use assembler::*;
pub use categories::*;
pub use confidence::*;
pub use engine::SuperIndicator;
pub use regime::*;
pub use scoring::*;
