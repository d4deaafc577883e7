//! Storage trait definition

use std::fmt::Debug;

use crate::domain::DomainError;

use super::entity::VariantRecord;

#[cfg(test)]
use mockall::automock;

/// Blocking key-value storage for assignment records.
///
/// Each key holds one flat `test name -> variant name` record. Writes replace
/// the whole record.
#[cfg_attr(test, automock)]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Retrieves the record stored under `key`
    fn get(&self, key: &str) -> Result<Option<VariantRecord>, DomainError>;

    /// Stores `record` under `key`, overwriting any previous record
    fn set(&self, key: &str, record: &VariantRecord) -> Result<(), DomainError>;

    /// Deletes the record under `key`, returns true if one existed
    fn remove(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if a record exists under `key`
    fn contains(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key)?.is_some())
    }
}
