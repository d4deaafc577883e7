//! Experiment domain entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::Distribution;
use crate::domain::DomainError;

/// Name of the control variant
pub const CONTROL: &str = "control";

/// Name of the test variant of an A/B test
pub const TEST: &str = "test";

// ============================================================================
// WeightedVariant
// ============================================================================

/// A variant name paired with the share of traffic it receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedVariant {
    pub name: String,
    pub weight: f64,
}

impl WeightedVariant {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

impl<S: Into<String>> From<(S, f64)> for WeightedVariant {
    fn from((name, weight): (S, f64)) -> Self {
        Self::new(name, weight)
    }
}

// ============================================================================
// VariantSpec
// ============================================================================

/// The variants a test can allocate and how traffic is split between them.
///
/// Index 0 of [`VariantSpec::names`] is always the control position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantSpec {
    /// 50/50 split between `control` and `test`
    #[default]
    Ab,
    /// Even split, each variant receives `1 / names.len()`
    Split { names: Vec<String> },
    /// Explicit weight per variant, e.g. `[(control, 0.7), (test, 0.3)]`
    Weighted { entries: Vec<WeightedVariant> },
}

impl VariantSpec {
    /// Create an even split over the given variant names
    pub fn split<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Split {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a weighted spec from `(name, weight)` pairs
    pub fn weighted<I, W>(entries: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<WeightedVariant>,
    {
        Self::Weighted {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Variant names in declaration order
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Ab => vec![CONTROL.to_string(), TEST.to_string()],
            Self::Split { names } => names.clone(),
            Self::Weighted { entries } => entries.iter().map(|e| e.name.clone()).collect(),
        }
    }

    /// Per-variant weights, aligned with [`VariantSpec::names`]
    pub fn weights(&self) -> Vec<f64> {
        match self {
            Self::Ab => vec![0.5, 0.5],
            Self::Split { names } => {
                let weight = 1.0 / names.len() as f64;
                vec![weight; names.len()]
            }
            Self::Weighted { entries } => entries.iter().map(|e| e.weight).collect(),
        }
    }

    /// Validated distribution for allocation.
    ///
    /// Ab and Split are checked on variant count alone. Weighted entries must
    /// sum to exactly 1.
    pub fn distribution(&self) -> Result<Distribution, DomainError> {
        match self {
            Self::Ab => Distribution::even(2),
            Self::Split { names } => Distribution::even(names.len()),
            Self::Weighted { .. } => Distribution::new(&self.weights()),
        }
    }

    /// Variant names paired with their weights
    pub fn variants_and_weights(&self) -> Vec<(String, f64)> {
        self.names().into_iter().zip(self.weights()).collect()
    }

    /// Check whether `variant` is one of the declared names
    pub fn contains(&self, variant: &str) -> bool {
        match self {
            Self::Ab => variant == CONTROL || variant == TEST,
            Self::Split { names } => names.iter().any(|n| n == variant),
            Self::Weighted { entries } => entries.iter().any(|e| e.name == variant),
        }
    }

    /// Position of `variant` in [`VariantSpec::names`]
    pub fn index_of(&self, variant: &str) -> Option<usize> {
        self.names().iter().position(|n| n == variant)
    }
}

impl fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ab => write!(f, "ab"),
            Self::Split { names } => write!(f, "split({})", names.len()),
            Self::Weighted { entries } => write!(f, "weighted({})", entries.len()),
        }
    }
}

// ============================================================================
// Test
// ============================================================================

/// A named experiment.
///
/// Equality and hashing use the name only: two tests with the same name are
/// the same test even when their variant specs differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    name: String,
    #[serde(default)]
    variants: VariantSpec,
}

impl Test {
    /// Create a new test
    pub fn new(name: impl Into<String>, variants: VariantSpec) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }

    /// Create a 50/50 control/test experiment
    pub fn ab(name: impl Into<String>) -> Self {
        Self::new(name, VariantSpec::Ab)
    }

    /// Get the test name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the variant spec
    pub fn variants(&self) -> &VariantSpec {
        &self.variants
    }
}

impl PartialEq for Test {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Test {}

impl Hash for Test {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl AsRef<str> for Test {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
