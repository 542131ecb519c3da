//! Synthetic two-class Gaussian data

use crate::core::{Dataset, Result, SVMError};
use log::debug;
use ndarray::{concatenate, Array1, Array2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Two isotropic Gaussian clusters
///
/// Class `+1` is centred at the origin, class `-1` at `separation`. Samples
/// are shuffled, and the same seed always yields the same dataset.
#[derive(Debug, Clone)]
pub struct GaussianBlobs {
    /// Samples generated for each class
    pub n_per_class: usize,
    /// Translation between the two cluster centres, its length is the
    /// feature dimension
    pub separation: Vec<f64>,
    /// Standard deviation of each coordinate
    pub std_dev: f64,
    pub seed: u64,
}

impl Default for GaussianBlobs {
    fn default() -> Self {
        Self {
            n_per_class: 500,
            separation: vec![10.0, 0.0],
            std_dev: 1.0,
            seed: 0,
        }
    }
}

impl GaussianBlobs {
    pub fn new(n_per_class: usize, separation: Vec<f64>) -> Self {
        Self {
            n_per_class,
            separation,
            ..Default::default()
        }
    }

    pub fn with_std_dev(mut self, std_dev: f64) -> Self {
        self.std_dev = std_dev;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn dim(&self) -> usize {
        self.separation.len()
    }

    /// Generate the dataset
    pub fn generate(&self) -> Result<Dataset> {
        if self.n_per_class == 0 {
            return Err(SVMError::EmptyDataset);
        }
        if self.separation.is_empty() {
            return Err(SVMError::InvalidParameter(
                "separation vector must not be empty".to_string(),
            ));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "standard deviation must be finite and non-negative, got: {}",
                self.std_dev
            )));
        }

        let dim = self.dim();
        let n = self.n_per_class;
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let positive: Array2<f64> =
            Array2::random_using((dim, n), StandardNormal, &mut rng) * self.std_dev;
        let offset = Array1::from(self.separation.clone()).insert_axis(Axis(1));
        let negative: Array2<f64> =
            Array2::random_using((dim, n), StandardNormal, &mut rng) * self.std_dev + &offset;

        let features = concatenate(Axis(1), &[positive.view(), negative.view()])
            .map_err(|e| SVMError::InvalidDataset(e.to_string()))?;
        let labels = Array1::from_shape_fn(2 * n, |i| if i < n { 1.0 } else { -1.0 });

        let mut order: Vec<usize> = (0..2 * n).collect();
        order.shuffle(&mut rng);

        debug!(
            "Generated {} samples in {} dimensions (seed {})",
            2 * n,
            dim,
            self.seed
        );

        Dataset::new(
            features.select(Axis(1), &order),
            labels.select(Axis(0), &order),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape_and_labels() {
        let data = GaussianBlobs::new(50, vec![10.0, 0.0]).generate().unwrap();
        assert_eq!(data.n_samples(), 100);
        assert_eq!(data.dim(), 2);
        assert_eq!(data.class_counts(), (50, 50));
    }

    #[test]
    fn test_clusters_are_translated() {
        let data = GaussianBlobs::new(200, vec![10.0, 0.0])
            .with_seed(3)
            .generate()
            .unwrap();

        let (mut pos_mean, mut neg_mean) = (0.0, 0.0);
        for i in 0..data.n_samples() {
            if data.label(i) > 0.0 {
                pos_mean += data.sample(i)[0] / 200.0;
            } else {
                neg_mean += data.sample(i)[0] / 200.0;
            }
        }
        assert!(pos_mean.abs() < 0.5, "positive mean {pos_mean}");
        assert!((neg_mean - 10.0).abs() < 0.5, "negative mean {neg_mean}");
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = GaussianBlobs::new(20, vec![1.0, 2.0, 3.0]).with_seed(9);
        let first = a.generate().unwrap();
        let second = a.generate().unwrap();
        assert_eq!(first.features(), second.features());
        assert_eq!(first.labels(), second.labels());

        let other = a.clone().with_seed(10).generate().unwrap();
        assert_ne!(first.features(), other.features());
    }

    #[test]
    fn test_zero_spread_collapses_to_centres() {
        let data = GaussianBlobs::new(5, vec![4.0, -1.0])
            .with_std_dev(0.0)
            .generate()
            .unwrap();
        for i in 0..data.n_samples() {
            let expected = if data.label(i) > 0.0 {
                vec![0.0, 0.0]
            } else {
                vec![4.0, -1.0]
            };
            assert_eq!(data.sample(i).to_vec(), expected);
        }
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(GaussianBlobs::new(0, vec![1.0]).generate().is_err());
        assert!(GaussianBlobs::new(5, vec![]).generate().is_err());
        assert!(GaussianBlobs::new(5, vec![1.0])
            .with_std_dev(-1.0)
            .generate()
            .is_err());
    }
}
