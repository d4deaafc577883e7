//! Storage infrastructure - Storage implementations

mod factory;
mod file;
mod in_memory;
mod redis;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use redis::{RedisOps, RedisStore, RedisStoreConfig};
