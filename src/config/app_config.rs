use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::experiment::Test;
use crate::domain::storage::DEFAULT_STORAGE_KEY;
use crate::domain::DomainError;
use crate::infrastructure::experiment::{Configuration, UniformSource};
use crate::infrastructure::storage::{RedisStoreConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub experiments: ExperimentSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where assignments are persisted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory`, `file` or `redis`
    pub backend: String,
    /// Document used by the file backend
    pub path: PathBuf,
    pub redis_url: Option<String>,
    pub redis_prefix: Option<String>,
}

/// Test definitions and engine options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExperimentSettings {
    pub storage_key: String,
    /// Legacy key migrated into `storage_key` at start-up
    pub migrate_from: Option<String>,
    /// Fixed seed for reproducible allocation
    pub seed: Option<u64>,
    pub tests: Vec<Test>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: PathBuf::from("variant-kit.json"),
            redis_url: None,
            redis_prefix: None,
        }
    }
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            migrate_from: None,
            seed: None,
            tests: Vec::new(),
        }
    }
}

impl StorageSettings {
    /// Translate the settings into a backend configuration
    pub fn storage_config(&self) -> Result<StorageConfig, DomainError> {
        let storage_type = StorageType::from_str(&self.backend).ok_or_else(|| {
            DomainError::configuration(format!("Unknown storage backend: '{}'", self.backend))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::File => Ok(StorageConfig::file(self.path.clone())),
            StorageType::Redis => {
                let url = self.redis_url.as_deref().ok_or_else(|| {
                    DomainError::configuration("Redis backend requires storage.redis_url")
                })?;

                let mut config = RedisStoreConfig::new(url);
                if let Some(prefix) = &self.redis_prefix {
                    config = config.with_key_prefix(prefix.clone());
                }
                Ok(StorageConfig::redis(config))
            }
        }
    }
}

impl ExperimentSettings {
    /// Engine configuration with a uniform source, seeded when `seed` is set
    pub fn configuration(&self) -> Configuration {
        let random = self
            .seed
            .map(UniformSource::seeded)
            .unwrap_or_default();

        Configuration::new(self.tests.clone())
            .with_storage_key(self.storage_key.clone())
            .with_random_source(random)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load defaults, `config/default`, `config/local`, then `explicit` (which
    /// must exist when given), then `APP__*` environment variables.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse a TOML document on its own, without files or environment
    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::VariantSpec;

    const SAMPLE: &str = r#"
[logging]
level = "debug"
format = "json"

[storage]
backend = "file"
path = "/tmp/assignments.json"

[experiments]
storage_key = "app.assignments"
migrate_from = "legacy.assignments"
seed = 7

[[experiments.tests]]
name = "checkout_button"

[[experiments.tests]]
name = "pricing_page"
variants = { type = "split", names = ["control", "monthly", "annual"] }

[[experiments.tests]]
name = "onboarding"

[experiments.tests.variants]
type = "weighted"
entries = [
    { name = "control", weight = 0.3 },
    { name = "guided", weight = 0.7 },
]
"#;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_empty_document_uses_defaults() {
            let config = AppConfig::from_toml("").unwrap();

            assert_eq!(config.logging.level, "info");
            assert_eq!(config.logging.format, LogFormat::Pretty);
            assert_eq!(config.storage.backend, "memory");
            assert_eq!(config.storage.path, PathBuf::from("variant-kit.json"));
            assert_eq!(config.experiments.storage_key, DEFAULT_STORAGE_KEY);
            assert!(config.experiments.tests.is_empty());
            assert!(config.experiments.migrate_from.is_none());
        }

        #[test]
        fn test_partial_section_keeps_other_defaults() {
            let config = AppConfig::from_toml("[logging]\nformat = \"json\"\n").unwrap();

            assert_eq!(config.logging.level, "info");
            assert_eq!(config.logging.format, LogFormat::Json);
        }
    }

    mod parsing_tests {
        use super::*;

        #[test]
        fn test_sample_document() {
            let config = AppConfig::from_toml(SAMPLE).unwrap();

            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.storage.backend, "file");
            assert_eq!(config.experiments.storage_key, "app.assignments");
            assert_eq!(
                config.experiments.migrate_from.as_deref(),
                Some("legacy.assignments")
            );
            assert_eq!(config.experiments.seed, Some(7));

            let tests = &config.experiments.tests;
            assert_eq!(tests.len(), 3);
            assert_eq!(tests[0].variants(), &VariantSpec::Ab);
            assert_eq!(
                tests[1].variants(),
                &VariantSpec::split(["control", "monthly", "annual"])
            );
            assert_eq!(tests[2].variants().weights(), vec![0.3, 0.7]);
        }

        #[test]
        fn test_unknown_variant_type_fails() {
            let result = AppConfig::from_toml(
                "[[experiments.tests]]\nname = \"x\"\nvariants = { type = \"bandit\" }\n",
            );
            assert!(result.is_err());
        }

        #[test]
        fn test_explicit_file_is_loaded() {
            let dir = tempfile::TempDir::new().unwrap();
            let path = dir.path().join("variant-kit.toml");
            std::fs::write(&path, SAMPLE).unwrap();

            let config = AppConfig::load_from(Some(&path)).unwrap();
            assert_eq!(config.experiments.tests.len(), 3);
        }

        #[test]
        fn test_missing_explicit_file_fails() {
            let dir = tempfile::TempDir::new().unwrap();
            let path = dir.path().join("absent.toml");

            assert!(AppConfig::load_from(Some(&path)).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_storage_config_per_backend() {
            let mut settings = StorageSettings::default();
            assert_eq!(
                settings.storage_config().unwrap().storage_type(),
                StorageType::InMemory
            );

            settings.backend = "json".to_string();
            assert_eq!(
                settings.storage_config().unwrap().storage_type(),
                StorageType::File
            );

            settings.backend = "redis".to_string();
            settings.redis_url = Some("redis://localhost:6379".to_string());
            settings.redis_prefix = Some("vk".to_string());
            match settings.storage_config().unwrap() {
                StorageConfig::Redis(redis) => {
                    assert_eq!(redis.url, "redis://localhost:6379");
                    assert_eq!(redis.key_prefix.as_deref(), Some("vk"));
                }
                other => panic!("Expected Redis config, got {:?}", other),
            }
        }

        #[test]
        fn test_unknown_backend() {
            let settings = StorageSettings {
                backend: "postgres".to_string(),
                ..Default::default()
            };
            assert!(matches!(
                settings.storage_config(),
                Err(DomainError::Configuration { .. })
            ));
        }

        #[test]
        fn test_redis_without_url() {
            let settings = StorageSettings {
                backend: "redis".to_string(),
                ..Default::default()
            };
            assert_eq!(
                settings.storage_config().unwrap_err(),
                DomainError::configuration("Redis backend requires storage.redis_url")
            );
        }

        #[test]
        fn test_seeded_configuration_is_reproducible() {
            let settings = AppConfig::from_toml(SAMPLE).unwrap().experiments;
            let mut a = settings.configuration();
            let mut b = settings.configuration();

            assert_eq!(a.storage_key, "app.assignments");
            assert_eq!(a.tests.len(), 3);
            for _ in 0..5 {
                assert_eq!(a.random.next_draw(), b.random.next_draw());
            }
        }
    }
}
