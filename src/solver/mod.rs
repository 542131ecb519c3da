//! Solvers for the linear SVM objective
//!
//! - [`BfgsSolver`]: quasi-Newton minimization of the full objective using
//!   value and gradient.
//! - [`PegasosSolver`]: stochastic sub-gradient descent on mini-batches.

pub mod bfgs;
pub mod pegasos;

pub use self::bfgs::*;
pub use self::pegasos::*;

use crate::core::{BfgsConfig, PegasosConfig};

/// Solver selection with its configuration
#[derive(Debug, Clone)]
pub enum SolverKind {
    Bfgs(BfgsConfig),
    Pegasos(PegasosConfig),
}

impl Default for SolverKind {
    fn default() -> Self {
        SolverKind::Bfgs(BfgsConfig::default())
    }
}

impl SolverKind {
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::Bfgs(_) => "bfgs",
            SolverKind::Pegasos(_) => "pegasos",
        }
    }
}
