//! Variant Kit
//!
//! Sticky A/B test variant allocation:
//! - A/B, even split and weighted tests
//! - One random allocation per test, remembered afterwards
//! - Write-through persistence to memory, a JSON file or Redis
//! - Migration of assignments stored under a legacy key

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{DomainError, Test, VariantSpec, WeightedVariant, CONTROL, TEST};
pub use infrastructure::experiment::{Configuration, SequenceSource, UniformSource};
pub use infrastructure::services::ExperimentEngine;
