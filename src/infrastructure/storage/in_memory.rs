//! In-memory storage implementation

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::storage::{KeyValueStore, VariantRecord};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, VariantRecord>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = (String, VariantRecord)>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Number of keys holding a record
    pub fn count(&self) -> Result<usize, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records.len())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<VariantRecord>, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, record: &VariantRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        records.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(records.remove(key).is_some())
    }
}
