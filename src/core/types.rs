//! Core type definitions for the linear SVM

use crate::core::{Result, SVMError};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Labeled dense dataset
///
/// Features are stored as a `d x n` matrix with one column per sample, the
/// layout the objective works on. Labels are `+1.0` or `-1.0`.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<f64>,
}

impl Dataset {
    /// Create a dataset from a `d x n` feature matrix and `n` labels
    pub fn new(features: Array2<f64>, labels: Array1<f64>) -> Result<Self> {
        let (dim, n_samples) = features.dim();

        if n_samples == 0 || labels.is_empty() {
            return Err(SVMError::EmptyDataset);
        }
        if labels.len() != n_samples {
            return Err(SVMError::DimensionMismatch {
                expected: n_samples,
                actual: labels.len(),
            });
        }
        if dim == 0 {
            return Err(SVMError::InvalidDataset(
                "samples must have at least one feature".to_string(),
            ));
        }
        if let Some(&label) = labels.iter().find(|&&l| l != 1.0 && l != -1.0) {
            return Err(SVMError::InvalidLabel(label));
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(SVMError::InvalidDataset(
                "feature values must be finite".to_string(),
            ));
        }

        Ok(Self { features, labels })
    }

    /// Create a dataset from an `n x d` matrix with one row per sample
    pub fn from_rows(rows: Array2<f64>, labels: Array1<f64>) -> Result<Self> {
        Self::new(rows.reversed_axes(), labels)
    }

    /// Number of samples (n)
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Feature dimension (d)
    pub fn dim(&self) -> usize {
        self.features.nrows()
    }

    /// Feature matrix, `d x n`
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Labels, one per sample
    pub fn labels(&self) -> ArrayView1<'_, f64> {
        self.labels.view()
    }

    /// Feature vector of sample `i`
    ///
    /// # Panics
    /// Panics if `i >= n_samples()`
    pub fn sample(&self, i: usize) -> ArrayView1<'_, f64> {
        self.features.column(i)
    }

    /// Label of sample `i`
    pub fn label(&self, i: usize) -> f64 {
        self.labels[i]
    }

    /// Copy the given samples into a new dataset (used for mini-batches)
    ///
    /// # Panics
    /// Panics if an index is out of bounds
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select(Axis(1), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Number of positive and negative samples
    pub fn class_counts(&self) -> (usize, usize) {
        let positive = self.labels.iter().filter(|&&l| l > 0.0).count();
        (positive, self.n_samples() - positive)
    }
}

/// Linear decision function `f(x) = theta^T x + b`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    /// Weight vector
    pub theta: Array1<f64>,
    /// Bias term, `None` when the model has no intercept
    pub bias: Option<f64>,
}

impl LinearModel {
    pub fn new(theta: Array1<f64>, bias: Option<f64>) -> Self {
        Self { theta, bias }
    }

    /// All-zero model of dimension `dim`
    pub fn zeros(dim: usize, fit_bias: bool) -> Self {
        Self {
            theta: Array1::zeros(dim),
            bias: fit_bias.then_some(0.0),
        }
    }

    pub fn dim(&self) -> usize {
        self.theta.len()
    }

    /// Number of free parameters: `d`, or `d + 1` with a bias
    pub fn n_params(&self) -> usize {
        self.theta.len() + usize::from(self.bias.is_some())
    }

    pub fn decision_function(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.theta.dot(&x) + self.bias.unwrap_or(0.0)
    }

    /// Decision values for every sample in `dataset`
    pub fn decision_values(&self, dataset: &Dataset) -> Array1<f64> {
        let mut scores = dataset.features().t().dot(&self.theta);
        if let Some(b) = self.bias {
            scores += b;
        }
        scores
    }

    /// Margins `u_i = y_i (theta^T x_i + b)`
    pub fn margins(&self, dataset: &Dataset) -> Array1<f64> {
        self.decision_values(dataset) * &dataset.labels()
    }

    /// Pack into a single parameter vector `[theta; b]`
    pub fn to_params(&self) -> Array1<f64> {
        let mut params = Array1::zeros(self.n_params());
        params.slice_mut(s![..self.theta.len()]).assign(&self.theta);
        if let Some(b) = self.bias {
            params[self.theta.len()] = b;
        }
        params
    }

    /// Inverse of [`LinearModel::to_params`]
    pub fn from_params(params: ArrayView1<'_, f64>, fit_bias: bool) -> Self {
        if fit_bias {
            let d = params.len() - 1;
            Self::new(params.slice(s![..d]).to_owned(), Some(params[d]))
        } else {
            Self::new(params.to_owned(), None)
        }
    }
}

/// How the bias regularizer enters the objective value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiasPenalty {
    /// Add `lambda0 / 2 * b^2` only when `b > 0`
    #[default]
    Positive,
    /// Add `lambda0 / 2 * b^2` for every `b`
    Always,
}

/// Regularization and smoothing parameters of the objective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveParams {
    /// Weight of `||theta||^2 / 2`
    pub lambda: f64,
    /// Weight of `b^2 / 2`
    pub lambda0: f64,
    /// Half-width of the Huber band, 0 selects the plain hinge loss
    pub huber: f64,
    pub bias_penalty: BiasPenalty,
}

impl Default for ObjectiveParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            lambda0: 0.0,
            huber: 0.0,
            bias_penalty: BiasPenalty::Positive,
        }
    }
}

impl ObjectiveParams {
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "lambda must be finite and non-negative, got: {}",
                self.lambda
            )));
        }
        if !self.lambda0.is_finite() || self.lambda0 < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "lambda0 must be finite and non-negative, got: {}",
                self.lambda0
            )));
        }
        if !self.huber.is_finite() || self.huber < 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "huber width must be finite and non-negative, got: {}",
                self.huber
            )));
        }
        Ok(())
    }
}

/// Configuration for the quasi-Newton solver
#[derive(Debug, Clone)]
pub struct BfgsConfig {
    /// Maximum number of BFGS iterations
    pub max_iterations: u64,
    /// Stop when the gradient norm falls below this value
    pub gradient_tolerance: f64,
    /// Stop when the change in cost falls below this value
    pub cost_tolerance: f64,
}

impl Default for BfgsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            gradient_tolerance: 1e-6,
            cost_tolerance: 1e-10,
        }
    }
}

/// Configuration for the Pegasos stochastic sub-gradient solver
#[derive(Debug, Clone)]
pub struct PegasosConfig {
    /// Number of sub-gradient steps
    pub iterations: usize,
    /// Mini-batch size k
    pub batch_size: usize,
    /// Project theta onto the ball of radius 1/sqrt(lambda) after each step
    pub project: bool,
    /// Iterations between full-objective evaluations of the current iterate
    pub eval_every: usize,
    /// Seed for mini-batch selection
    pub seed: u64,
}

impl Default for PegasosConfig {
    fn default() -> Self {
        Self {
            iterations: 2000,
            batch_size: 10,
            project: true,
            eval_every: 100,
            seed: 0,
        }
    }
}

/// Result of a solver run
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// Best parameters found
    pub model: LinearModel,
    /// Number of iterations performed
    pub iterations: usize,
    /// Objective value at `model`
    pub objective_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn toy_dataset() -> Dataset {
        Dataset::from_rows(
            array![[1.0, 2.0], [-1.0, -2.0], [0.5, 0.0]],
            array![1.0, -1.0, 1.0],
        )
        .expect("valid dataset")
    }

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(1.0, 2.5);
        assert_eq!(pred.label, 1.0);
        assert_eq!(pred.decision_value, 2.5);
        assert_eq!(pred.confidence(), 2.5);

        let neg_pred = Prediction::new(-1.0, -1.8);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_dataset_from_rows_layout() {
        let data = toy_dataset();
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.dim(), 2);
        assert_eq!(data.sample(1).to_vec(), vec![-1.0, -2.0]);
        assert_eq!(data.label(1), -1.0);
        assert_eq!(data.class_counts(), (2, 1));
    }

    #[test]
    fn test_dataset_rejects_label_count_mismatch() {
        let result = Dataset::new(Array2::zeros((2, 3)), array![1.0, -1.0]);
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_dataset_rejects_bad_labels() {
        let result = Dataset::new(Array2::zeros((2, 2)), array![1.0, 0.0]);
        assert!(matches!(result, Err(SVMError::InvalidLabel(l)) if l == 0.0));
    }

    #[test]
    fn test_dataset_rejects_empty() {
        let result = Dataset::new(Array2::zeros((2, 0)), Array1::zeros(0));
        assert!(matches!(result, Err(SVMError::EmptyDataset)));
    }

    #[test]
    fn test_dataset_rejects_non_finite() {
        let result = Dataset::new(array![[f64::NAN, 1.0]], array![1.0, -1.0]);
        assert!(matches!(result, Err(SVMError::InvalidDataset(_))));
    }

    #[test]
    fn test_dataset_select() {
        let data = toy_dataset();
        let batch = data.select(&[2, 0, 2]);
        assert_eq!(batch.n_samples(), 3);
        assert_eq!(batch.sample(0).to_vec(), vec![0.5, 0.0]);
        assert_eq!(batch.labels().to_vec(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_linear_model_margins() {
        let data = toy_dataset();
        let model = LinearModel::new(array![1.0, 0.0], Some(0.5));

        let margins = model.margins(&data);
        assert_eq!(margins.to_vec(), vec![1.5, 0.5, 1.0]);
        assert_eq!(model.decision_function(data.sample(1)), -0.5);
    }

    #[test]
    fn test_linear_model_param_packing() {
        let model = LinearModel::new(array![1.0, -2.0], Some(3.0));
        let params = model.to_params();
        assert_eq!(params.to_vec(), vec![1.0, -2.0, 3.0]);
        assert_eq!(LinearModel::from_params(params.view(), true), model);

        let unbiased = LinearModel::new(array![4.0], None);
        assert_eq!(unbiased.n_params(), 1);
        assert_eq!(
            LinearModel::from_params(unbiased.to_params().view(), false),
            unbiased
        );
    }

    #[test]
    fn test_objective_params_validation() {
        assert!(ObjectiveParams::default().validate().is_ok());

        let negative_huber = ObjectiveParams {
            huber: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            negative_huber.validate(),
            Err(SVMError::InvalidParameter(_))
        ));

        let negative_lambda = ObjectiveParams {
            lambda: -1.0,
            ..Default::default()
        };
        assert!(negative_lambda.validate().is_err());

        let nan_lambda0 = ObjectiveParams {
            lambda0: f64::NAN,
            ..Default::default()
        };
        assert!(nan_lambda0.validate().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let bfgs = BfgsConfig::default();
        assert_eq!(bfgs.max_iterations, 500);
        assert_eq!(bfgs.gradient_tolerance, 1e-6);

        let pegasos = PegasosConfig::default();
        assert_eq!(pegasos.batch_size, 10);
        assert!(pegasos.project);
        assert_eq!(ObjectiveParams::default().bias_penalty, BiasPenalty::Positive);
    }
}
