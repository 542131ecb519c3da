//! Linear Support Vector Machine toolkit
//!
//! Evaluates the regularized hinge / Huber-smoothed hinge objective with its
//! gradient and Hessian, and minimizes it with a quasi-Newton method or the
//! Pegasos stochastic sub-gradient method.

pub mod api;
pub mod core;
pub mod data;
pub mod objective;
pub mod optimizer;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SVMError};
pub use crate::data::{DiscreteSampler, GaussianBlobs};
pub use crate::objective::{ActiveSet, Evaluation, Order, SmoothedHinge, SvmObjective};
pub use crate::optimizer::{SVMOptimizer, TrainedSVM};
pub use crate::solver::{BfgsSolver, PegasosSolver, SolverKind};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
