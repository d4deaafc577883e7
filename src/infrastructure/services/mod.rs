//! Infrastructure services

mod experiment_engine;

pub use experiment_engine::{AllocationHook, ExperimentEngine, VariantHandler};
