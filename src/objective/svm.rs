//! Regularized empirical risk of a linear SVM
//!
//! ```text
//! v(theta, b) = lambda/2 ||theta||^2 + [b > 0] lambda0/2 b^2
//!             + 1/n sum_i loss(y_i (theta^T x_i + b); h)
//! ```
//!
//! The evaluator is meant to be called at high frequency from inside an
//! optimizer. Inputs are validated once by [`SvmObjective::new`] and
//! [`SvmObjective::check_point`]; [`SvmObjective::evaluate`] itself does not
//! check anything.

use crate::core::{BiasPenalty, Dataset, LinearModel, ObjectiveParams, Result, SVMError};
use crate::objective::loss::{Region, SmoothedHinge};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};

/// Which outputs to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Order {
    Value,
    Gradient,
    Hessian,
}

/// Samples that contribute beyond the regularizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveSet {
    /// Indices with `u_i < 1 + h`
    pub support: Vec<usize>,
    /// `alpha_i = -dloss/du` for each entry of `support`
    pub alpha: Vec<f64>,
    /// Indices with `1 - h < u_i < 1 + h`, a subset of `support`
    pub quadratic: Vec<usize>,
}

impl ActiveSet {
    pub fn n_support(&self) -> usize {
        self.support.len()
    }

    pub fn n_quadratic(&self) -> usize {
        self.quadratic.len()
    }
}

/// Output of one objective evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: f64,
    /// Gradient w.r.t. `[theta; b]` (or `theta` without bias)
    pub gradient: Option<Array1<f64>>,
    /// Hessian w.r.t. `[theta; b]` (or `theta` without bias)
    pub hessian: Option<Array2<f64>>,
    /// Support and quadratic-band samples at the evaluated point
    pub active: ActiveSet,
}

/// Objective evaluator bound to a dataset and fixed parameters
#[derive(Debug, Clone, Copy)]
pub struct SvmObjective<'a> {
    data: &'a Dataset,
    params: ObjectiveParams,
    loss: SmoothedHinge,
}

impl<'a> SvmObjective<'a> {
    /// Bind the objective to a dataset, validating the parameters
    pub fn new(data: &'a Dataset, params: ObjectiveParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::with_validated(data, params))
    }

    /// Bind parameters that were already validated, e.g. to a mini-batch
    /// drawn from the dataset of a validated objective
    pub(crate) fn with_validated(data: &'a Dataset, params: ObjectiveParams) -> Self {
        Self {
            data,
            params,
            loss: SmoothedHinge::new(params.huber),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.data
    }

    pub fn params(&self) -> &ObjectiveParams {
        &self.params
    }

    pub fn loss(&self) -> SmoothedHinge {
        self.loss
    }

    /// Validate a point before handing it to an optimization loop
    pub fn check_point(&self, theta: ArrayView1<'_, f64>, bias: Option<f64>) -> Result<()> {
        if theta.len() != self.data.dim() {
            return Err(SVMError::DimensionMismatch {
                expected: self.data.dim(),
                actual: theta.len(),
            });
        }
        if theta.iter().any(|v| !v.is_finite()) || bias.map_or(false, |b| !b.is_finite()) {
            return Err(SVMError::InvalidParameter(
                "initial point must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Evaluate the objective at `(theta, bias)` up to the requested order
    ///
    /// The support and band index sets are computed once and shared by
    /// every requested output.
    pub fn evaluate(
        &self,
        theta: ArrayView1<'_, f64>,
        bias: Option<f64>,
        order: Order,
    ) -> Evaluation {
        let features = self.data.features();
        let labels = self.data.labels();
        let n = self.data.n_samples() as f64;
        let lambda = self.params.lambda;

        let mut scores = features.t().dot(&theta);
        if let Some(b) = bias {
            scores += b;
        }

        let mut active = ActiveSet::default();
        let mut risk = 0.0;
        for (i, (&score, &y)) in scores.iter().zip(labels.iter()).enumerate() {
            let u = y * score;
            let region = self.loss.region(u);
            if region == Region::Inactive {
                continue;
            }
            risk += self.loss.value(u);
            active.support.push(i);
            active.alpha.push(self.loss.alpha(u));
            if region == Region::Quadratic {
                active.quadratic.push(i);
            }
        }

        let value = 0.5 * lambda * theta.dot(&theta) + self.bias_penalty(bias) + risk / n;

        let gradient = (order >= Order::Gradient).then(|| self.gradient(theta, bias, &active));
        let hessian = (order >= Order::Hessian).then(|| self.hessian(bias.is_some(), &active));

        Evaluation {
            value,
            gradient,
            hessian,
            active,
        }
    }

    pub fn value(&self, theta: ArrayView1<'_, f64>, bias: Option<f64>) -> f64 {
        self.evaluate(theta, bias, Order::Value).value
    }

    pub fn value_and_gradient(
        &self,
        theta: ArrayView1<'_, f64>,
        bias: Option<f64>,
    ) -> (f64, Array1<f64>) {
        let eval = self.evaluate(theta, bias, Order::Gradient);
        (eval.value, eval.gradient.unwrap_or_default())
    }

    pub fn value_gradient_hessian(
        &self,
        theta: ArrayView1<'_, f64>,
        bias: Option<f64>,
    ) -> (f64, Array1<f64>, Array2<f64>) {
        let eval = self.evaluate(theta, bias, Order::Hessian);
        (
            eval.value,
            eval.gradient.unwrap_or_default(),
            eval.hessian.unwrap_or_default(),
        )
    }

    /// Evaluate at a model, see [`SvmObjective::evaluate`]
    pub fn evaluate_model(&self, model: &LinearModel, order: Order) -> Evaluation {
        self.evaluate(model.theta.view(), model.bias, order)
    }

    fn bias_penalty(&self, bias: Option<f64>) -> f64 {
        match (bias, self.params.bias_penalty) {
            (Some(b), BiasPenalty::Positive) if b > 0.0 => 0.5 * self.params.lambda0 * b * b,
            (Some(b), BiasPenalty::Always) => 0.5 * self.params.lambda0 * b * b,
            _ => 0.0,
        }
    }

    fn gradient(
        &self,
        theta: ArrayView1<'_, f64>,
        bias: Option<f64>,
        active: &ActiveSet,
    ) -> Array1<f64> {
        let d = self.data.dim();
        let n = self.data.n_samples() as f64;
        let labels = self.data.labels();

        let mut grad = Array1::zeros(d + usize::from(bias.is_some()));
        let mut grad_theta = theta.to_owned() * self.params.lambda;
        let mut bias_sum = 0.0;
        for (&i, &alpha) in active.support.iter().zip(&active.alpha) {
            let weight = alpha * labels[i];
            grad_theta.scaled_add(-weight / n, &self.data.sample(i));
            bias_sum += weight;
        }
        grad.slice_mut(s![..d]).assign(&grad_theta);

        if let Some(b) = bias {
            grad[d] = self.params.lambda0 * b - bias_sum / n;
        }
        grad
    }

    fn hessian(&self, with_bias: bool, active: &ActiveSet) -> Array2<f64> {
        let d = self.data.dim();
        let size = d + usize::from(with_bias);

        let mut hess = Array2::zeros((size, size));
        for j in 0..d {
            hess[[j, j]] = self.params.lambda;
        }
        if with_bias {
            hess[[d, d]] = self.params.lambda0;
        }
        if active.quadratic.is_empty() {
            return hess;
        }

        let scale = 1.0 / (2.0 * self.loss.width() * self.data.n_samples() as f64);
        let band = self.data.features().select(Axis(1), &active.quadratic);

        let mut block = hess.slice_mut(s![..d, ..d]);
        block.scaled_add(scale, &band.dot(&band.t()));

        if with_bias {
            let row = band.sum_axis(Axis(1)) * scale;
            hess.slice_mut(s![..d, d]).assign(&row);
            hess.slice_mut(s![d, ..d]).assign(&row);
            hess[[d, d]] += scale * active.quadratic.len() as f64;
        }
        hess
    }
}
