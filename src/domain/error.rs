use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown test: '{name}'")]
    UnknownTest { name: String },

    #[error("Unknown variant '{variant}' for test '{test}'")]
    UnknownVariant { test: String, variant: String },

    #[error("Number of variants must be greater than one, got {count}")]
    TooFewVariants { count: usize },

    #[error("Variant weights must sum to exactly 1, got {sum}")]
    WeightsNotNormalized { sum: f64 },

    #[error("Random value out of range [0, 1): {value:?}")]
    RandomOutOfRange { value: Option<f64> },

    #[error("No variant bucket contains draw {draw}")]
    AllocationIndexNotFound { draw: f64 },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn unknown_test(name: impl Into<String>) -> Self {
        Self::UnknownTest { name: name.into() }
    }

    pub fn unknown_variant(test: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::UnknownVariant {
            test: test.into(),
            variant: variant.into(),
        }
    }

    pub fn too_few_variants(count: usize) -> Self {
        Self::TooFewVariants { count }
    }

    pub fn weights_not_normalized(sum: f64) -> Self {
        Self::WeightsNotNormalized { sum }
    }

    pub fn random_out_of_range(value: Option<f64>) -> Self {
        Self::RandomOutOfRange { value }
    }

    pub fn allocation_index_not_found(draw: f64) -> Self {
        Self::AllocationIndexNotFound { draw }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this error came from the storage backend rather than validation
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}
