//! Persisted record types

use std::collections::HashMap;

/// Storage key used when a configuration does not name one
pub const DEFAULT_STORAGE_KEY: &str = "variant_kit.assignments";

/// The persisted form of an assignment table: test name to variant name
pub type VariantRecord = HashMap<String, String>;
