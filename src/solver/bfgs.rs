//! Quasi-Newton (BFGS) minimization of the SVM objective
//!
//! The objective is exposed to `argmin` as a cost function with gradient
//! over the packed parameter vector `[theta; b]`. Only value and gradient are
//! used: the analytic Hessian is nonzero only on the thin Huber band and is a
//! poor model for Newton steps.

use crate::core::{BfgsConfig, LinearModel, Result, SVMError, SolveResult, Solver};
use crate::objective::{Order, SvmObjective};
use argmin::core::{CostFunction, Error as ArgminError, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::BFGS;
use log::{debug, info};
use ndarray::{s, Array1, Array2, ArrayView1};

/// Objective over the packed parameter vector used by `argmin`
struct PackedObjective<'o, 'a> {
    objective: &'o SvmObjective<'a>,
    fit_bias: bool,
}

impl PackedObjective<'_, '_> {
    fn split<'p>(&self, params: &'p Array1<f64>) -> (ArrayView1<'p, f64>, Option<f64>) {
        if self.fit_bias {
            let d = params.len() - 1;
            (params.slice(s![..d]), Some(params[d]))
        } else {
            (params.view(), None)
        }
    }
}

impl CostFunction for PackedObjective<'_, '_> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        let (theta, bias) = self.split(params);
        Ok(self.objective.value(theta, bias))
    }
}

impl Gradient for PackedObjective<'_, '_> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, params: &Self::Param) -> std::result::Result<Self::Gradient, ArgminError> {
        let (theta, bias) = self.split(params);
        let (_, grad) = self.objective.value_and_gradient(theta, bias);
        Ok(grad)
    }
}

/// BFGS with More-Thuente line search, starting from the identity as
/// inverse Hessian approximation
#[derive(Debug, Clone, Default)]
pub struct BfgsSolver {
    config: BfgsConfig,
}

impl BfgsSolver {
    pub fn new(config: BfgsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BfgsConfig {
        &self.config
    }
}

impl Solver for BfgsSolver {
    fn name(&self) -> &'static str {
        "bfgs"
    }

    fn solve(&self, objective: &SvmObjective<'_>, initial: LinearModel) -> Result<SolveResult> {
        let fit_bias = initial.bias.is_some();
        let init_params = initial.to_params();
        let n_params = init_params.len();

        let initial_cost = objective.evaluate_model(&initial, Order::Value).value;
        if !initial_cost.is_finite() {
            return Err(SVMError::OptimizationError(format!(
                "initial objective value is not finite: {initial_cost}"
            )));
        }
        info!(
            "Starting BFGS with {} parameters, initial objective {:.6}",
            n_params, initial_cost
        );

        let to_error = |e: ArgminError| SVMError::OptimizationError(e.to_string());
        let linesearch = MoreThuenteLineSearch::new();
        let solver = BFGS::new(linesearch)
            .with_tolerance_grad(self.config.gradient_tolerance)
            .map_err(to_error)?
            .with_tolerance_cost(self.config.cost_tolerance)
            .map_err(to_error)?;

        let problem = PackedObjective {
            objective,
            fit_bias,
        };
        let max_iterations = self.config.max_iterations;
        let result = Executor::new(problem, solver)
            .configure(|state| {
                state
                    .param(init_params)
                    .inv_hessian(Array2::eye(n_params))
                    .max_iters(max_iterations)
            })
            .run()
            .map_err(to_error)?;

        let state = result.state();
        let iterations = state.get_iter() as usize;
        let best = state.get_best_param().cloned().ok_or_else(|| {
            SVMError::OptimizationError("BFGS finished without a best parameter".to_string())
        })?;
        let model = LinearModel::from_params(best.view(), fit_bias);
        let objective_value = objective.evaluate_model(&model, Order::Value).value;

        debug!("BFGS best cost reported by solver: {}", state.get_best_cost());
        info!(
            "BFGS finished after {} iterations, objective {:.6}",
            iterations, objective_value
        );

        Ok(SolveResult {
            model,
            iterations,
            objective_value,
        })
    }
}
