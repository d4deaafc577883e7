//! Domain layer - Core experiment types, storage abstraction and errors

pub mod error;
pub mod experiment;
pub mod storage;

pub use error::DomainError;
pub use experiment::{
    allocate, Distribution, RandomSource, Test, TestRegistry, VariantSpec, WeightedVariant,
    CONTROL, TEST,
};
pub use storage::{KeyValueStore, VariantRecord, DEFAULT_STORAGE_KEY};
