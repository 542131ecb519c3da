//! Core traits for the linear SVM

use crate::core::{Dataset, LinearModel, Prediction, Result, SolveResult};
use crate::objective::SvmObjective;
use ndarray::ArrayView1;

/// Trained SVM model
pub trait SVMModel: Send + Sync {
    /// Predict a single feature vector
    fn predict(&self, x: ArrayView1<'_, f64>) -> Prediction;

    /// Predict every sample of a dataset
    fn predict_batch(&self, dataset: &Dataset) -> Vec<Prediction> {
        (0..dataset.n_samples())
            .map(|i| self.predict(dataset.sample(i)))
            .collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term (0 for models without intercept)
    fn bias(&self) -> f64;
}

/// Minimizes an [`SvmObjective`] starting from an initial model
///
/// Implementations may assume the objective and the initial model were
/// validated by the caller.
pub trait Solver: Send + Sync {
    /// Short solver name used in logs and reports
    fn name(&self) -> &'static str;

    fn solve(&self, objective: &SvmObjective<'_>, initial: LinearModel) -> Result<SolveResult>;
}
