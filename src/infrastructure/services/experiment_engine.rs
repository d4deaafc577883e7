//! Experiment engine for A/B testing
//!
//! Allocates a variant the first time a test is queried, remembers it, and
//! writes every change through to the configured storage backend.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::domain::experiment::{RandomSource, Test, TestRegistry};
use crate::domain::storage::{KeyValueStore, VariantRecord};
use crate::domain::DomainError;
use crate::infrastructure::experiment::{AssignmentStore, Configuration};

/// Callback fired with `(variant, test name)` after every stored assignment
pub type AllocationHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Code to run for one variant, see [`ExperimentEngine::run`]
pub type VariantHandler<'a> = Box<dyn FnOnce() + 'a>;

struct EngineState {
    store: AssignmentStore,
    random: Box<dyn RandomSource>,
}

/// Allocates and remembers one variant per test.
///
/// The assignment table and the random source share a single lock, so the
/// engine can be used from several threads behind an `Arc`. Hooks and variant
/// handlers run after the lock is released and may call back into the engine.
pub struct ExperimentEngine {
    registry: TestRegistry,
    storage_key: String,
    state: Mutex<EngineState>,
    allocation_hook: Option<AllocationHook>,
}

impl fmt::Debug for ExperimentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentEngine")
            .field("registry", &self.registry)
            .field("storage_key", &self.storage_key)
            .field("allocation_hook", &self.allocation_hook.is_some())
            .finish()
    }
}

impl ExperimentEngine {
    /// Create an engine and load previously persisted assignments
    pub fn new(config: Configuration, storage: Arc<dyn KeyValueStore>) -> Self {
        let Configuration {
            tests,
            storage_key,
            random,
        } = config;

        let registry = TestRegistry::with_tests(tests);
        let mut store = AssignmentStore::new(storage, storage_key.clone());
        let loaded = store.load_from(&registry, &storage_key);

        info!(
            tests = registry.len(),
            loaded,
            key = %storage_key,
            "Experiment engine initialized"
        );

        Self {
            registry,
            storage_key,
            state: Mutex::new(EngineState { store, random }),
            allocation_hook: None,
        }
    }

    /// Register a callback fired after each stored assignment
    pub fn with_allocation_hook(
        mut self,
        hook: impl Fn(&str, &str) + Send + Sync + 'static,
    ) -> Self {
        self.allocation_hook = Some(Arc::new(hook));
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>, DomainError> {
        self.state.lock().map_err(|e| {
            DomainError::storage(format!("Failed to acquire engine lock: {}", e))
        })
    }

    fn notify(&self, variant: &str, test: &str) {
        if let Some(hook) = &self.allocation_hook {
            hook(variant, test);
        }
    }

    /// Look up the registered definition of a test
    pub fn resolve_test(&self, test: impl AsRef<str>) -> Result<&Test, DomainError> {
        self.registry.resolve(test.as_ref())
    }

    /// All registered tests, sorted by name
    pub fn all_tests(&self) -> Vec<&Test> {
        let mut tests: Vec<&Test> = self.registry.iter().collect();
        tests.sort_by(|a, b| a.name().cmp(b.name()));
        tests
    }

    /// The key assignments are persisted under
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// The variant for `test`, allocating and persisting one on first use.
    ///
    /// The test's distribution is validated before a draw is taken, so an
    /// invalid test never consumes a value from the random source.
    pub fn variant(&self, test: impl AsRef<str>) -> Result<String, DomainError> {
        let name = test.as_ref();

        let variant = {
            let mut state = self.lock()?;

            if let Some(variant) = state.store.get(name) {
                debug!(test = %name, variant = %variant, "Returning existing assignment");
                return Ok(variant.to_string());
            }

            let test = self.registry.resolve(name)?;
            let distribution = test.variants().distribution()?;
            let draw = state.random.next_draw();
            debug!(test = %name, draw = ?draw, "Drew random value");

            let index = distribution.select(draw)?;
            let mut names = test.variants().names();
            if index >= names.len() {
                return Err(DomainError::allocation_index_not_found(draw.unwrap_or(f64::NAN)));
            }
            let variant = names.swap_remove(index);

            state.store.put(test, &variant)?;
            info!(test = %name, variant = %variant, "Allocated variant");
            variant
        };

        self.notify(&variant, name);
        Ok(variant)
    }

    /// Force `test` to `variant`, persisting even when nothing changes
    pub fn set_variant(&self, test: impl AsRef<str>, variant: &str) -> Result<(), DomainError> {
        let name = test.as_ref();
        let test = self.registry.resolve(name)?;

        self.lock()?.store.put(test, variant)?;
        info!(test = %name, variant = %variant, "Variant overridden");

        self.notify(variant, name);
        Ok(())
    }

    /// Whether `test` is assigned anything other than its control variant
    pub fn is_test_variant(&self, test: impl AsRef<str>) -> Result<bool, DomainError> {
        let name = test.as_ref();
        let variant = self.variant(name)?;
        let test = self.registry.resolve(name)?;

        Ok(test
            .variants()
            .index_of(&variant)
            .is_some_and(|index| index != 0))
    }

    /// Invoke the handler at the position of the assigned variant.
    ///
    /// A missing handler for that position does nothing.
    pub fn run(
        &self,
        test: impl AsRef<str>,
        handlers: Vec<Option<VariantHandler<'_>>>,
    ) -> Result<(), DomainError> {
        let name = test.as_ref();
        let variant = self.variant(name)?;
        let test = self.registry.resolve(name)?;

        let handler = test
            .variants()
            .index_of(&variant)
            .and_then(|index| handlers.into_iter().nth(index))
            .flatten();

        if let Some(handler) = handler {
            handler();
        }
        Ok(())
    }

    /// Run `on_control` or `on_test` depending on [`ExperimentEngine::is_test_variant`]
    pub fn run_ab(
        &self,
        test: impl AsRef<str>,
        on_control: impl FnOnce(),
        on_test: impl FnOnce(),
    ) -> Result<(), DomainError> {
        if self.is_test_variant(test)? {
            on_test();
        } else {
            on_control();
        }
        Ok(())
    }

    /// Declared `(variant, weight)` pairs of `test`
    pub fn all_variants_and_weights(
        &self,
        test: impl AsRef<str>,
    ) -> Result<Vec<(String, f64)>, DomainError> {
        Ok(self.resolve_test(test)?.variants().variants_and_weights())
    }

    /// Snapshot of the current assignments keyed by test name
    pub fn variants_by_test_name(&self) -> Result<VariantRecord, DomainError> {
        Ok(self.lock()?.store.snapshot())
    }

    /// Reload assignments from the storage key, returning how many were kept
    pub fn load(&self) -> Result<usize, DomainError> {
        let mut state = self.lock()?;
        Ok(state.store.load_from(&self.registry, &self.storage_key))
    }

    /// Persist the current assignments
    pub fn save(&self) -> Result<(), DomainError> {
        self.lock()?.store.persist()
    }

    /// Forget every assignment and delete the persisted record
    pub fn reset(&self) -> Result<(), DomainError> {
        self.lock()?.store.reset()
    }

    /// Replace the assignments with the record stored under `from`.
    ///
    /// Returns `None` when nothing is stored there, otherwise the entries that
    /// did not match a registered test and variant.
    pub fn migrate(&self, from: &str) -> Result<Option<VariantRecord>, DomainError> {
        self.lock()?.store.migrate(&self.registry, from)
    }
}
