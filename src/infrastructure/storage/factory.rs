//! Storage factory for runtime storage selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::storage::KeyValueStore;
use crate::domain::DomainError;

use super::file::FileStore;
use super::in_memory::InMemoryStore;
use super::redis::{RedisStore, RedisStoreConfig};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// Single JSON file on disk
    File,
    /// Redis server
    Redis,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "file" | "json" => Some(Self::File),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// JSON file storage configuration
    File(PathBuf),
    /// Redis storage configuration
    Redis(RedisStoreConfig),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a JSON file storage configuration
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates a Redis storage configuration
    pub fn redis(config: RedisStoreConfig) -> Self {
        Self::Redis(config)
    }

    /// Creates a Redis configuration from a URL
    pub fn redis_url(url: impl Into<String>) -> Self {
        Self::Redis(RedisStoreConfig::new(url))
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::File(_) => StorageType::File,
            Self::Redis(_) => StorageType::Redis,
        }
    }
}

/// Factory for creating storage instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a storage instance based on the configuration
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, DomainError> {
        match config {
            StorageConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StorageConfig::File(path) => Ok(Arc::new(FileStore::new(path.clone()))),
            StorageConfig::Redis(redis_config) => {
                Ok(Arc::new(RedisStore::connect(redis_config.clone())?))
            }
        }
    }
}
