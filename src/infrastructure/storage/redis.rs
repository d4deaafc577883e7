//! Redis storage implementation

use std::fmt;
use std::sync::Mutex;

use redis::Client;

use crate::domain::storage::{KeyValueStore, VariantRecord};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Configuration for Redis storage
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// The Redis commands the store issues
#[cfg_attr(test, automock)]
pub trait RedisOps: Send {
    fn get(&mut self, key: &str) -> Result<Option<String>, String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn del(&mut self, key: &str) -> Result<i64, String>;
    fn ping(&mut self) -> Result<(), String>;
}

impl RedisOps for redis::Connection {
    fn get(&mut self, key: &str) -> Result<Option<String>, String> {
        redis::cmd("GET")
            .arg(key)
            .query::<Option<String>>(self)
            .map_err(|e| e.to_string())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query::<()>(self)
            .map_err(|e| e.to_string())
    }

    fn del(&mut self, key: &str) -> Result<i64, String> {
        redis::cmd("DEL")
            .arg(key)
            .query::<i64>(self)
            .map_err(|e| e.to_string())
    }

    fn ping(&mut self) -> Result<(), String> {
        redis::cmd("PING")
            .query::<String>(self)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Stores each record as a JSON object string under `<prefix>:<key>`
pub struct RedisStore {
    connection: Mutex<Box<dyn RedisOps>>,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<Connection>")
            .finish()
    }
}

impl RedisStore {
    /// Opens a blocking connection and pings the server
    pub fn connect(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = client
            .get_connection()
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Self::with_connection(config, connection)
    }

    /// Wraps an existing connection, pinging it first
    pub fn with_connection(
        config: RedisStoreConfig,
        mut connection: impl RedisOps + 'static,
    ) -> Result<Self, DomainError> {
        connection
            .ping()
            .map_err(|e| DomainError::storage(format!("Redis ping failed: {}", e)))?;

        Ok(Self {
            connection: Mutex::new(Box::new(connection)),
            config,
        })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut dyn RedisOps) -> Result<T, String>,
        context: impl FnOnce() -> String,
    ) -> Result<T, DomainError> {
        let mut conn = self.connection.lock().map_err(|e| {
            DomainError::storage(format!("Failed to acquire connection lock: {}", e))
        })?;

        op(&mut **conn).map_err(|e| DomainError::storage(format!("{}: {}", context(), e)))
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<VariantRecord>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let raw = self.with_conn(
            |conn| conn.get(&prefixed_key),
            || format!("Failed to get key '{}'", key),
        )?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                DomainError::storage(format!("Failed to parse record '{}': {}", key, e))
            })
        })
        .transpose()
    }

    fn set(&self, key: &str, record: &VariantRecord) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let json = serde_json::to_string(record)
            .map_err(|e| DomainError::storage(format!("Failed to serialize record: {}", e)))?;

        self.with_conn(
            |conn| conn.set(&prefixed_key, &json),
            || format!("Failed to set key '{}'", key),
        )
    }

    fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let deleted = self.with_conn(
            |conn| conn.del(&prefixed_key),
            || format!("Failed to delete key '{}'", key),
        )?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinging() -> MockRedisOps {
        let mut ops = MockRedisOps::new();
        ops.expect_ping().times(1).returning(|| Ok(()));
        ops
    }

    fn prefixed() -> RedisStoreConfig {
        RedisStoreConfig::new("redis://localhost").with_key_prefix("vk")
    }

    #[test]
    fn test_config_builder() {
        let config = RedisStoreConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert!(config.key_prefix.is_none());

        let config = prefixed();
        assert_eq!(config.key_prefix.as_deref(), Some("vk"));
    }

    #[test]
    fn test_ping_failure_rejects_connection() {
        let mut ops = MockRedisOps::new();
        ops.expect_ping()
            .returning(|| Err("connection refused".to_string()));

        let err = RedisStore::with_connection(prefixed(), ops).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_get_parses_json_under_prefixed_key() {
        let mut ops = pinging();
        ops.expect_get()
            .withf(|key| key == "vk:assignments")
            .returning(|_| Ok(Some(r#"{"feature":"test"}"#.to_string())));

        let store = RedisStore::with_connection(prefixed(), ops).unwrap();
        let record = store.get("assignments").unwrap().unwrap();
        assert_eq!(record.get("feature").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_get_missing_key() {
        let mut ops = pinging();
        ops.expect_get()
            .withf(|key| key == "assignments")
            .returning(|_| Ok(None));

        let store = RedisStore::with_connection(RedisStoreConfig::default(), ops).unwrap();
        assert_eq!(store.get("assignments").unwrap(), None);
    }

    #[test]
    fn test_get_malformed_json_is_storage_error() {
        let mut ops = pinging();
        ops.expect_get()
            .returning(|_| Ok(Some("not json".to_string())));

        let store = RedisStore::with_connection(prefixed(), ops).unwrap();
        assert!(store.get("assignments").unwrap_err().is_storage());
    }

    #[test]
    fn test_set_writes_json() {
        let mut ops = pinging();
        ops.expect_set()
            .withf(|key, value| key == "vk:assignments" && value == r#"{"feature":"control"}"#)
            .times(1)
            .returning(|_, _| Ok(()));

        let store = RedisStore::with_connection(prefixed(), ops).unwrap();
        let record = VariantRecord::from([("feature".to_string(), "control".to_string())]);
        store.set("assignments", &record).unwrap();
    }

    #[test]
    fn test_set_failure_is_storage_error() {
        let mut ops = pinging();
        ops.expect_set()
            .returning(|_, _| Err("READONLY".to_string()));

        let store = RedisStore::with_connection(prefixed(), ops).unwrap();
        let err = store.set("assignments", &VariantRecord::new()).unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("Failed to set key 'assignments'"));
    }

    #[test]
    fn test_remove_reports_deleted() {
        let mut ops = pinging();
        let mut deleted = 1;
        ops.expect_del().times(2).returning(move |_| {
            let result = deleted;
            deleted = 0;
            Ok(result)
        });

        let store = RedisStore::with_connection(prefixed(), ops).unwrap();
        assert!(store.remove("assignments").unwrap());
        assert!(!store.remove("assignments").unwrap());
    }
}
