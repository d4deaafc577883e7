//! Infrastructure for experiment allocation
//!
//! Random sources, engine configuration and the write-through assignment table.

mod assignment_store;
mod configuration;
mod random;

pub use assignment_store::AssignmentStore;
pub use configuration::Configuration;
pub use random::{SequenceSource, UniformSource};
