//! Objective function of the regularized linear SVM
//!
//! Supplies value, gradient and Hessian of the hinge or Huber-smoothed hinge
//! risk for use by a generic optimizer.

pub mod loss;
pub mod svm;

pub use self::loss::*;
pub use self::svm::*;
