//! Cumulative-weight bucketing of random draws into variant indices

use crate::domain::DomainError;

/// Validated cumulative breakpoints for a set of variant weights.
///
/// Weights `[0.1, 0.2, 0.3, 0.4]` become breakpoints `[0.1, 0.3, 0.6, 1.0]`.
/// Each variant owns the half-open range `[previous, breakpoint)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    breakpoints: Vec<f64>,
}

impl Distribution {
    /// Validate weights and build the cumulative breakpoints.
    ///
    /// Weights must describe more than one variant and sum to exactly 1.
    pub fn new(weights: &[f64]) -> Result<Self, DomainError> {
        if weights.len() <= 1 {
            return Err(DomainError::too_few_variants(weights.len()));
        }

        let sum: f64 = weights.iter().sum();

        if sum != 1.0 {
            return Err(DomainError::weights_not_normalized(sum));
        }

        let breakpoints = weights
            .iter()
            .scan(0.0, |running, weight| {
                *running += weight;
                Some(*running)
            })
            .collect();

        Ok(Self { breakpoints })
    }

    /// Even split over `count` variants.
    ///
    /// Only the count is validated. Breakpoints are `i / count`, so the last
    /// one is exactly 1 whatever rounding `1 / count` would have.
    pub fn even(count: usize) -> Result<Self, DomainError> {
        if count <= 1 {
            return Err(DomainError::too_few_variants(count));
        }

        let breakpoints = (1..=count).map(|i| i as f64 / count as f64).collect();

        Ok(Self { breakpoints })
    }

    /// Cumulative breakpoints, one per variant
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Number of variants covered
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// Always false for a validated distribution
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Map a draw in `[0, 1)` to a variant index.
    ///
    /// A missing draw is treated the same as one outside the range.
    pub fn select(&self, draw: Option<f64>) -> Result<usize, DomainError> {
        let draw = match draw {
            Some(value) if (0.0..1.0).contains(&value) => value,
            other => return Err(DomainError::random_out_of_range(other)),
        };

        self.breakpoints
            .iter()
            .position(|&breakpoint| draw < breakpoint)
            .ok_or_else(|| DomainError::allocation_index_not_found(draw))
    }
}

/// Validate `weights` and select the bucket containing `draw` in one step
pub fn allocate(weights: &[f64], draw: f64) -> Result<usize, DomainError> {
    Distribution::new(weights)?.select(Some(draw))
}
