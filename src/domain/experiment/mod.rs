//! Experiment domain module for A/B testing
//!
//! Test definitions, the weighted bucketing function that maps a random draw
//! to a variant, and the registry used to resolve tests by name.

mod distribution;
mod entity;
mod random;
mod registry;

// Re-export all public types
pub use distribution::{allocate, Distribution};
pub use entity::{Test, VariantSpec, WeightedVariant, CONTROL, TEST};
pub use random::RandomSource;
pub use registry::TestRegistry;
