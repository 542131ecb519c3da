//! High-level API for training linear SVMs
//!
//! This module provides a builder over the objective parameters and the
//! solver choice, plus prediction and evaluation helpers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use linsvm::api::SVM;
//! use linsvm::data::GaussianBlobs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = GaussianBlobs::default().generate()?;
//!
//! let svm = SVM::new()
//!     .with_lambda(10.0)
//!     .with_huber(0.0)
//!     .train(&data)?;
//!
//! println!("Accuracy: {:.2}%", svm.evaluate(&data) * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    BfgsConfig, BiasPenalty, Dataset, ObjectiveParams, PegasosConfig, Prediction, Result,
    SVMError, SVMModel,
};
use crate::optimizer::{SVMOptimizer, TrainedSVM};
use crate::solver::{BfgsSolver, PegasosSolver, SolverKind};
use crate::utils::stats::DEFAULT_SUPPORT_TOLERANCE;
use ndarray::ArrayView1;

/// High-level linear SVM interface with builder pattern
#[derive(Debug, Clone)]
pub struct SVM {
    params: ObjectiveParams,
    fit_bias: bool,
    solver: SolverKind,
    support_tolerance: f64,
}

impl SVM {
    /// Create a new SVM with default parameters, a bias term and BFGS
    pub fn new() -> Self {
        Self {
            params: ObjectiveParams::default(),
            fit_bias: true,
            solver: SolverKind::default(),
            support_tolerance: DEFAULT_SUPPORT_TOLERANCE,
        }
    }
}

impl Default for SVM {
    fn default() -> Self {
        Self::new()
    }
}

impl SVM {
    /// Set the weight regularization lambda
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.params.lambda = lambda;
        self
    }

    /// Set the bias regularization lambda0
    pub fn with_lambda0(mut self, lambda0: f64) -> Self {
        self.params.lambda0 = lambda0;
        self
    }

    /// Set the Huber band half-width (0 for the plain hinge loss)
    pub fn with_huber(mut self, huber: f64) -> Self {
        self.params.huber = huber;
        self
    }

    pub fn with_bias_penalty(mut self, bias_penalty: BiasPenalty) -> Self {
        self.params.bias_penalty = bias_penalty;
        self
    }

    /// Model an intercept term
    pub fn with_bias(mut self, fit_bias: bool) -> Self {
        self.fit_bias = fit_bias;
        self
    }

    /// Slack on `1 + h` when reporting support vectors
    pub fn with_support_tolerance(mut self, tolerance: f64) -> Self {
        self.support_tolerance = tolerance;
        self
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Use BFGS with the given configuration
    pub fn with_bfgs(self, config: BfgsConfig) -> Self {
        self.with_solver(SolverKind::Bfgs(config))
    }

    /// Use Pegasos with the given configuration
    pub fn with_pegasos(self, config: PegasosConfig) -> Self {
        self.with_solver(SolverKind::Pegasos(config))
    }

    pub fn params(&self) -> &ObjectiveParams {
        &self.params
    }

    /// Train on a dataset
    pub fn train(self, dataset: &Dataset) -> Result<TrainedModel> {
        let model = match self.solver {
            SolverKind::Bfgs(config) => {
                SVMOptimizer::new(BfgsSolver::new(config), self.params, self.fit_bias)
                    .with_support_tolerance(self.support_tolerance)
                    .train(dataset)?
            }
            SolverKind::Pegasos(config) => {
                SVMOptimizer::new(PegasosSolver::new(config), self.params, self.fit_bias)
                    .with_support_tolerance(self.support_tolerance)
                    .train(dataset)?
            }
        };
        Ok(TrainedModel { model })
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel {
    model: TrainedSVM,
}

impl TrainedModel {
    /// Predict a single feature vector
    pub fn predict(&self, x: ArrayView1<'_, f64>) -> Prediction {
        self.model.predict(x)
    }

    /// Predict every sample of a dataset
    pub fn predict_dataset(&self, dataset: &Dataset) -> Vec<Prediction> {
        self.model.predict_batch(dataset)
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate(&self, dataset: &Dataset) -> f64 {
        self.evaluate_detailed(dataset).accuracy()
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed(&self, dataset: &Dataset) -> EvaluationMetrics {
        let predictions = self.predict_dataset(dataset);
        EvaluationMetrics::from_predictions(&predictions, dataset.labels())
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        let summary = self.model.summary();
        ModelInfo {
            theta: self.model.model().theta.to_vec(),
            bias: self.model.model().bias,
            n_support_vectors: summary.support_indices.len(),
            margin_violations: summary.margin_violations,
            objective_value: self.model.objective_value(),
            iterations: self.model.iterations(),
            support_vector_indices: summary.support_indices.clone(),
        }
    }

    /// Get the underlying trained model
    pub fn inner(&self) -> &TrainedSVM {
        &self.model
    }
}

/// Confusion counts for binary predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl EvaluationMetrics {
    /// Count outcomes of `predictions` against `labels`
    pub fn from_predictions(predictions: &[Prediction], labels: ArrayView1<'_, f64>) -> Self {
        let mut metrics = Self::default();
        for (pred, &actual) in predictions.iter().zip(labels.iter()) {
            match (pred.label > 0.0, actual > 0.0) {
                (true, true) => metrics.true_positives += 1,
                (false, false) => metrics.true_negatives += 1,
                (true, false) => metrics.false_positives += 1,
                (false, true) => metrics.false_negatives += 1,
            }
        }
        metrics
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// (TP + TN) / total
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub theta: Vec<f64>,
    pub bias: Option<f64>,
    pub n_support_vectors: usize,
    pub margin_violations: usize,
    pub objective_value: f64,
    pub iterations: usize,
    pub support_vector_indices: Vec<usize>,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a hinge-loss SVM with bias using BFGS
    pub fn train_hinge(dataset: &Dataset, lambda: f64) -> Result<TrainedModel> {
        SVM::new().with_lambda(lambda).train(dataset)
    }

    /// Train on one dataset and return the accuracy on another
    pub fn evaluate_split(train: &Dataset, test: &Dataset, lambda: f64) -> Result<f64> {
        if train.dim() != test.dim() {
            return Err(SVMError::DimensionMismatch {
                expected: train.dim(),
                actual: test.dim(),
            });
        }
        let model = train_hinge(train, lambda)?;
        Ok(model.evaluate(test))
    }

    /// Hold out the tail of a dataset for testing (not randomized)
    pub fn simple_validation(dataset: &Dataset, train_ratio: f64, lambda: f64) -> Result<f64> {
        if train_ratio <= 0.0 || train_ratio >= 1.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.n_samples();
        let train_size = (n as f64 * train_ratio) as usize;
        if train_size == 0 || train_size == n {
            return Err(SVMError::InvalidDataset(format!(
                "cannot split {n} samples with ratio {train_ratio}"
            )));
        }

        let train_idx: Vec<usize> = (0..train_size).collect();
        let test_idx: Vec<usize> = (train_size..n).collect();
        evaluate_split(&dataset.select(&train_idx), &dataset.select(&test_idx), lambda)
    }
}
