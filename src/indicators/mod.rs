pub mod normalizer;
pub mod registry;

pub use normalizer::*;
pub use registry::*;
