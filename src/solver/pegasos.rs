//! Pegasos: primal estimated sub-gradient solver
//!
//! Each step draws a mini-batch of `k` samples with replacement, takes the
//! objective's (sub-)gradient on that batch and moves against it with step
//! size `1 / (lambda t)`. Optionally the weights are projected back onto the
//! ball of radius `1 / sqrt(lambda)`, which contains the optimum.

use crate::core::{LinearModel, PegasosConfig, Result, SVMError, SolveResult, Solver};
use crate::data::DiscreteSampler;
use crate::objective::{Order, SvmObjective};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Stochastic sub-gradient solver
#[derive(Debug, Clone, Default)]
pub struct PegasosSolver {
    config: PegasosConfig,
}

impl PegasosSolver {
    pub fn new(config: PegasosConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PegasosConfig {
        &self.config
    }

    fn validate(&self, lambda: f64) -> Result<()> {
        if lambda <= 0.0 {
            return Err(SVMError::InvalidParameter(format!(
                "Pegasos requires lambda > 0, got: {lambda}"
            )));
        }
        if self.config.batch_size == 0 {
            return Err(SVMError::InvalidParameter(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.config.iterations == 0 || self.config.eval_every == 0 {
            return Err(SVMError::InvalidParameter(
                "iterations and eval_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scale `theta` back into the ball of radius `radius`
fn project(model: &mut LinearModel, radius: f64) {
    let norm = model.theta.dot(&model.theta).sqrt();
    if norm > radius {
        model.theta *= radius / norm;
    }
}

impl Solver for PegasosSolver {
    fn name(&self) -> &'static str {
        "pegasos"
    }

    fn solve(&self, objective: &SvmObjective<'_>, initial: LinearModel) -> Result<SolveResult> {
        let params = *objective.params();
        self.validate(params.lambda)?;

        let data = objective.dataset();
        let fit_bias = initial.bias.is_some();
        let sampler = DiscreteSampler::uniform(data.n_samples())?;
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let radius = 1.0 / params.lambda.sqrt();

        info!(
            "Starting Pegasos: {} iterations, batch size {}, lambda {}",
            self.config.iterations, self.config.batch_size, params.lambda
        );

        let mut model = initial;
        let mut best_model = model.clone();
        let mut best_value = objective.evaluate_model(&model, Order::Value).value;

        for t in 1..=self.config.iterations {
            let batch = data.select(&sampler.sample_n(&mut rng, self.config.batch_size));
            let batch_objective = SvmObjective::with_validated(&batch, params);
            let gradient = batch_objective
                .evaluate_model(&model, Order::Gradient)
                .gradient
                .ok_or_else(|| {
                    SVMError::OptimizationError("gradient was not computed".to_string())
                })?;

            let eta = 1.0 / (params.lambda * t as f64);
            let mut packed = model.to_params();
            packed.scaled_add(-eta, &gradient);
            model = LinearModel::from_params(packed.view(), fit_bias);

            if self.config.project {
                project(&mut model, radius);
            }

            if t % self.config.eval_every == 0 || t == self.config.iterations {
                let value = objective.evaluate_model(&model, Order::Value).value;
                debug!("Pegasos iteration {}: objective {:.6}", t, value);
                if !value.is_finite() {
                    return Err(SVMError::OptimizationError(format!(
                        "objective diverged at iteration {t}"
                    )));
                }
                if value < best_value {
                    best_value = value;
                    best_model = model.clone();
                }
            }
        }

        info!("Pegasos finished, best objective {:.6}", best_value);

        Ok(SolveResult {
            model: best_model,
            iterations: self.config.iterations,
            objective_value: best_value,
        })
    }
}
