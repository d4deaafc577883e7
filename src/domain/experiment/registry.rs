//! Registry of known test definitions

use std::collections::HashMap;

use super::entity::Test;
use crate::domain::DomainError;

/// The set of tests an engine knows about, keyed by name.
///
/// Registering two tests with the same name keeps the last one.
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    tests: HashMap<String, Test>,
}

impl TestRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of tests
    pub fn with_tests(tests: impl IntoIterator<Item = Test>) -> Self {
        let mut registry = Self::new();

        for test in tests {
            registry.register(test);
        }
        registry
    }

    /// Add a test, replacing any previous definition with the same name.
    ///
    /// Returns the replaced definition.
    pub fn register(&mut self, test: Test) -> Option<Test> {
        self.tests.insert(test.name().to_string(), test)
    }

    /// Look up a test by name
    pub fn resolve(&self, name: &str) -> Result<&Test, DomainError> {
        self.tests
            .get(name)
            .ok_or_else(|| DomainError::unknown_test(name))
    }

    /// Check whether `variant` is a declared variant of the test called `name`
    pub fn accepts(&self, name: &str, variant: &str) -> bool {
        self.tests
            .get(name)
            .is_some_and(|test| test.variants().contains(variant))
    }

    /// Iterate over all registered tests
    pub fn iter(&self) -> impl Iterator<Item = &Test> {
        self.tests.values()
    }

    /// Number of registered tests
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if no tests are registered
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::VariantSpec;

    fn registry() -> TestRegistry {
        TestRegistry::with_tests([
            Test::ab("ab_test1"),
            Test::ab("ab_test2"),
            Test::new("split_test", VariantSpec::split(["control", "test1", "test2"])),
        ])
    }

    #[test]
    fn test_resolve_known_test() {
        let registry = registry();
        let test = registry.resolve("ab_test1").unwrap();
        assert_eq!(test.name(), "ab_test1");
        assert_eq!(test.variants(), &VariantSpec::Ab);
    }

    #[test]
    fn test_resolve_unknown_test() {
        let registry = registry();
        assert_eq!(
            registry.resolve("unknown test").unwrap_err(),
            DomainError::unknown_test("unknown test")
        );
    }

    #[test]
    fn test_duplicate_names_collapse_last_wins() {
        let registry = TestRegistry::with_tests([
            Test::ab("feature"),
            Test::new("feature", VariantSpec::split(["control", "a", "b"])),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("feature").unwrap().variants().names().len(), 3);
    }

    #[test]
    fn test_register_returns_replaced() {
        let mut registry = TestRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Test::ab("feature")).is_none());
        assert!(registry.register(Test::ab("feature")).is_some());
    }

    #[test]
    fn test_accepts() {
        let registry = registry();
        assert!(registry.accepts("split_test", "test2"));
        assert!(!registry.accepts("split_test", "test"));
        assert!(!registry.accepts("missing", "control"));
    }

    #[test]
    fn test_iter_visits_every_test() {
        let registry = registry();
        let mut names: Vec<&str> = registry.iter().map(Test::name).collect();
        names.sort_unstable();
        assert_eq!(names, ["ab_test1", "ab_test2", "split_test"]);
    }
}
