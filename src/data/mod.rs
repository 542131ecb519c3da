//! Synthetic datasets and mini-batch sampling

pub mod sampling;
pub mod synthetic;

pub use self::sampling::*;
pub use self::synthetic::*;
