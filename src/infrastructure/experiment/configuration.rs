//! Engine construction parameters

use std::fmt;

use crate::domain::experiment::{RandomSource, Test};
use crate::domain::storage::DEFAULT_STORAGE_KEY;

use super::random::UniformSource;

/// Everything an [`ExperimentEngine`](crate::infrastructure::services::ExperimentEngine)
/// needs besides its storage backend.
pub struct Configuration {
    pub tests: Vec<Test>,
    pub storage_key: String,
    pub random: Box<dyn RandomSource>,
}

impl Configuration {
    /// Tests with the default storage key and a uniform random source
    pub fn new(tests: impl IntoIterator<Item = Test>) -> Self {
        Self {
            tests: tests.into_iter().collect(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            random: Box::new(UniformSource::new()),
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("tests", &self.tests)
            .field("storage_key", &self.storage_key)
            .field("random", &"<random source>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::experiment::SequenceSource;

    #[test]
    fn test_defaults() {
        let mut config = Configuration::new([Test::ab("feature")]);
        assert_eq!(config.tests.len(), 1);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        let draw = config.random.next_draw().unwrap();
        assert!((0.0..1.0).contains(&draw));
    }

    #[test]
    fn test_builder_overrides() {
        let mut config = Configuration::default()
            .with_storage_key("custom.key")
            .with_random_source(SequenceSource::new([0.75]));

        assert!(config.tests.is_empty());
        assert_eq!(config.storage_key, "custom.key");
        assert_eq!(config.random.next_draw(), Some(0.75));
        assert_eq!(config.random.next_draw(), None);
    }

    #[test]
    fn test_debug_hides_random_source() {
        let config = Configuration::new([Test::ab("feature")]);
        let debug = format!("{:?}", config);
        assert!(debug.contains("feature"));
        assert!(debug.contains("<random source>"));
    }
}
