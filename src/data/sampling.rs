//! Sampling from a finite discrete distribution
//!
//! Used to draw the mini-batches of the stochastic solvers. Draws use an
//! inverse-CDF lookup: a uniform `r` in `[0, 1)` selects the first index whose
//! cumulative probability is strictly greater than `r`.

use crate::core::{Result, SVMError};
use rand::distributions::Distribution;
use rand::Rng;

/// Discrete distribution over `0..n` with arbitrary non-negative weights
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteSampler {
    cumulative: Vec<f64>,
}

impl DiscreteSampler {
    /// Build a sampler from unnormalized weights
    pub fn new(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(SVMError::InvalidParameter(
                "sampling weights must not be empty".to_string(),
            ));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SVMError::InvalidParameter(format!(
                "sampling weights must be finite and non-negative, got: {w}"
            )));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SVMError::InvalidParameter(
                "sampling weights must not all be zero".to_string(),
            ));
        }

        let mut running = 0.0;
        let mut cumulative: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w / total;
                running
            })
            .collect();

        // Rounding may leave the total slightly below 1
        if let Some(last) = weights.iter().rposition(|&w| w > 0.0) {
            for c in &mut cumulative[last..] {
                *c = 1.0;
            }
        }

        Ok(Self { cumulative })
    }

    /// Uniform distribution over `0..n`
    pub fn uniform(n: usize) -> Result<Self> {
        Self::new(&vec![1.0; n])
    }

    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Probability of drawing index `i`, `None` when `i` is out of range
    pub fn probability(&self, i: usize) -> Option<f64> {
        let upper = *self.cumulative.get(i)?;
        let lower = match i {
            0 => 0.0,
            _ => self.cumulative[i - 1],
        };
        Some(upper - lower)
    }

    /// Map a uniform draw `r` in `[0, 1)` to an index
    pub fn index_of(&self, r: f64) -> usize {
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(self.cumulative.len() - 1)
    }

    /// Draw `k` indices with replacement
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> Vec<usize> {
        (0..k).map(|_| self.sample(rng)).collect()
    }
}

impl Distribution<usize> for DiscreteSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index_of(rng.gen::<f64>())
    }
}
