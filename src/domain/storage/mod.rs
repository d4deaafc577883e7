//! Storage domain - Key-value persistence abstraction for assignment records

mod entity;
mod repository;

pub use entity::{VariantRecord, DEFAULT_STORAGE_KEY};
pub use repository::KeyValueStore;

#[cfg(test)]
pub use repository::MockKeyValueStore;
