//! Optimization front-end for the linear SVM
//!
//! This module ties the objective to a solver: it validates the problem once
//! at entry, runs the solver from the zero model and summarizes the result.

use crate::core::{
    Dataset, LinearModel, ObjectiveParams, Prediction, Result, SVMError, SVMModel, Solver,
};
use crate::objective::SvmObjective;
use crate::utils::stats::{margin_summary, MarginSummary, DEFAULT_SUPPORT_TOLERANCE};
use log::{info, warn};
use ndarray::ArrayView1;

/// High-level optimizer that integrates the objective and a solver
pub struct SVMOptimizer<S: Solver> {
    solver: S,
    params: ObjectiveParams,
    fit_bias: bool,
    support_tolerance: f64,
}

impl<S: Solver> SVMOptimizer<S> {
    /// Create a new optimizer with the given solver and objective parameters
    pub fn new(solver: S, params: ObjectiveParams, fit_bias: bool) -> Self {
        Self {
            solver,
            params,
            fit_bias,
            support_tolerance: DEFAULT_SUPPORT_TOLERANCE,
        }
    }

    /// Create an optimizer with default objective parameters and a bias term
    pub fn with_solver(solver: S) -> Self {
        Self::new(solver, ObjectiveParams::default(), true)
    }

    /// Set the slack used when reporting support vectors (`u_i < 1 + h + tolerance`)
    pub fn with_support_tolerance(mut self, tolerance: f64) -> Self {
        self.support_tolerance = tolerance;
        self
    }

    /// Train a model on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<TrainedSVM> {
        let initial = LinearModel::zeros(dataset.dim(), self.fit_bias);
        self.train_from(dataset, initial)
    }

    /// Train starting from a given model
    pub fn train_from(&self, dataset: &Dataset, initial: LinearModel) -> Result<TrainedSVM> {
        let objective = SvmObjective::new(dataset, self.params)?;
        if !self.support_tolerance.is_finite() || self.support_tolerance < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "support tolerance must be finite and non-negative, got: {}",
                self.support_tolerance
            )));
        }
        objective.check_point(initial.theta.view(), initial.bias)?;
        if initial.bias.is_some() != self.fit_bias {
            return Err(SVMError::DimensionMismatch {
                expected: dataset.dim() + usize::from(self.fit_bias),
                actual: initial.n_params(),
            });
        }

        let (positive, negative) = dataset.class_counts();
        if positive == 0 || negative == 0 {
            warn!("Training data contains a single class ({positive} positive, {negative} negative)");
        }
        info!(
            "Training with {} on {} samples in {} dimensions",
            self.solver.name(),
            dataset.n_samples(),
            dataset.dim()
        );

        let result = self.solver.solve(&objective, initial)?;
        if result.model.theta.iter().any(|v| !v.is_finite())
            || result.model.bias.map_or(false, |b| !b.is_finite())
        {
            return Err(SVMError::OptimizationError(
                "solver returned non-finite parameters".to_string(),
            ));
        }

        let summary = margin_summary(&objective, &result.model, self.support_tolerance);
        info!(
            "Objective {:.6}, {} support vectors, {} margin violations",
            result.objective_value,
            summary.support_indices.len(),
            summary.margin_violations
        );

        Ok(TrainedSVM {
            model: result.model,
            objective_value: result.objective_value,
            iterations: result.iterations,
            summary,
            solver: self.solver.name(),
        })
    }

    pub fn params(&self) -> &ObjectiveParams {
        &self.params
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

/// A trained linear SVM
#[derive(Debug, Clone)]
pub struct TrainedSVM {
    model: LinearModel,
    objective_value: f64,
    iterations: usize,
    summary: MarginSummary,
    solver: &'static str,
}

impl TrainedSVM {
    /// Decision function value `theta^T x + b`
    pub fn decision_function(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.model.decision_function(x)
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Margin statistics on the training data
    pub fn summary(&self) -> &MarginSummary {
        &self.summary
    }

    /// Indices of training samples with `u_i < 1 + h + tolerance`
    pub fn support_vector_indices(&self) -> &[usize] {
        &self.summary.support_indices
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver
    }
}

impl SVMModel for TrainedSVM {
    fn predict(&self, x: ArrayView1<'_, f64>) -> Prediction {
        let decision_value = self.decision_function(x);
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }

    fn n_support_vectors(&self) -> usize {
        self.summary.support_indices.len()
    }

    fn bias(&self) -> f64 {
        self.model.bias.unwrap_or(0.0)
    }
}
