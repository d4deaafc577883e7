//! Write-through table of allocated variants
//!
//! The table maps test names to variant names. Every change is persisted as a
//! whole record under the configured storage key.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::experiment::{Test, TestRegistry};
use crate::domain::storage::{KeyValueStore, VariantRecord};
use crate::domain::DomainError;

/// In-memory assignment table backed by a [`KeyValueStore`]
#[derive(Debug)]
pub struct AssignmentStore {
    storage: Arc<dyn KeyValueStore>,
    storage_key: String,
    table: HashMap<String, String>,
}

impl AssignmentStore {
    /// Create an empty table; nothing is read until [`AssignmentStore::load_from`]
    pub fn new(storage: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
            table: HashMap::new(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Variant currently assigned to the test called `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.table.get(name).map(String::as_str)
    }

    /// Copy of the whole table
    pub fn snapshot(&self) -> VariantRecord {
        self.table.clone()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Assign `variant` to `test` and persist the table.
    ///
    /// A failed write restores the previous assignment before returning.
    pub fn put(&mut self, test: &Test, variant: &str) -> Result<(), DomainError> {
        if !test.variants().contains(variant) {
            return Err(DomainError::unknown_variant(test.name(), variant));
        }

        let previous = self
            .table
            .insert(test.name().to_string(), variant.to_string());

        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.table.insert(test.name().to_string(), old),
                None => self.table.remove(test.name()),
            };
            return Err(e);
        }

        Ok(())
    }

    /// Write the full table under the configured key
    pub fn persist(&self) -> Result<(), DomainError> {
        self.storage.set(&self.storage_key, &self.table)?;
        debug!(key = %self.storage_key, entries = self.table.len(), "Persisted assignments");
        Ok(())
    }

    /// Replace the table with the valid entries of the record stored at `key`.
    ///
    /// Entries naming an unknown test or variant are dropped. A missing record
    /// or a failed read leaves the table untouched. Returns the number of
    /// entries loaded.
    pub fn load_from(&mut self, registry: &TestRegistry, key: &str) -> usize {
        let Some(record) = self.read(key) else {
            return 0;
        };

        let (accepted, rejected) = partition(registry, record);
        for (name, variant) in &rejected {
            warn!(key = %key, test = %name, variant = %variant, "Dropping persisted assignment");
        }

        self.table = accepted;
        debug!(key = %key, entries = self.table.len(), "Loaded assignments");
        self.table.len()
    }

    /// Clear the table and delete the persisted record
    pub fn reset(&mut self) -> Result<(), DomainError> {
        self.table.clear();
        self.storage.remove(&self.storage_key)?;
        info!(key = %self.storage_key, "Reset assignments");
        Ok(())
    }

    /// Move the record stored at `from` into this table.
    ///
    /// Returns `None` when nothing is stored at `from`, leaving the table and
    /// the backend untouched. Otherwise the old record is deleted and the valid
    /// entries are persisted, then they replace the table. The table is kept
    /// as it was if either write fails.
    pub fn migrate(
        &mut self,
        registry: &TestRegistry,
        from: &str,
    ) -> Result<Option<VariantRecord>, DomainError> {
        let Some(record) = self.read(from) else {
            debug!(from = %from, "Nothing to migrate");
            return Ok(None);
        };

        let (accepted, rejected) = partition(registry, record);

        self.storage.remove(from)?;
        self.storage.set(&self.storage_key, &accepted)?;
        self.table = accepted;

        info!(
            from = %from,
            to = %self.storage_key,
            migrated = self.table.len(),
            rejected = rejected.len(),
            "Migrated assignments"
        );
        Ok(Some(rejected))
    }

    fn read(&self, key: &str) -> Option<VariantRecord> {
        match self.storage.get(key) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read assignments, ignoring");
                None
            }
        }
    }
}

/// Split a record into entries the registry accepts and the rest
fn partition(registry: &TestRegistry, record: VariantRecord) -> (VariantRecord, VariantRecord) {
    record
        .into_iter()
        .partition(|(name, variant)| registry.accepts(name, variant))
}
