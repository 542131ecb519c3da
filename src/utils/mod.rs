//! Utility functions for checking and summarizing objective evaluations

use crate::core::{Dataset, LinearModel};
use crate::objective::{Order, SvmObjective};

/// Finite-difference checks of the analytic derivatives
pub mod gradcheck {
    use super::*;
    use ndarray::Array1;

    /// Largest discrepancy between analytic and numeric derivatives
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct DerivativeCheck {
        pub max_abs_error: f64,
        /// Error relative to `max(1, |analytic|, |numeric|)`
        pub max_rel_error: f64,
        /// Number of compared entries
        pub n_entries: usize,
    }

    impl DerivativeCheck {
        fn from_pairs(pairs: impl Iterator<Item = (f64, f64)>) -> Self {
            let mut check = DerivativeCheck {
                max_abs_error: 0.0,
                max_rel_error: 0.0,
                n_entries: 0,
            };
            for (analytic, numeric) in pairs {
                let abs = (analytic - numeric).abs();
                let scale = 1.0_f64.max(analytic.abs()).max(numeric.abs());
                check.max_abs_error = check.max_abs_error.max(abs);
                check.max_rel_error = check.max_rel_error.max(abs / scale);
                check.n_entries += 1;
            }
            check
        }

        pub fn passes(&self, tolerance: f64) -> bool {
            self.max_rel_error <= tolerance
        }
    }

    fn perturbed(model: &LinearModel, k: usize, delta: f64) -> LinearModel {
        let mut params = model.to_params();
        params[k] += delta;
        LinearModel::from_params(params.view(), model.bias.is_some())
    }

    fn gradient_at(objective: &SvmObjective<'_>, model: &LinearModel) -> Array1<f64> {
        objective
            .evaluate_model(model, Order::Gradient)
            .gradient
            .unwrap_or_default()
    }

    /// Compare the gradient with central differences of the value
    pub fn check_gradient(
        objective: &SvmObjective<'_>,
        model: &LinearModel,
        step: f64,
    ) -> DerivativeCheck {
        let analytic = gradient_at(objective, model);
        let numeric: Vec<f64> = (0..model.n_params())
            .map(|k| {
                let plus = objective.evaluate_model(&perturbed(model, k, step), Order::Value);
                let minus = objective.evaluate_model(&perturbed(model, k, -step), Order::Value);
                (plus.value - minus.value) / (2.0 * step)
            })
            .collect();

        DerivativeCheck::from_pairs(analytic.iter().copied().zip(numeric))
    }

    /// Compare the Hessian with central differences of the gradient
    pub fn check_hessian(
        objective: &SvmObjective<'_>,
        model: &LinearModel,
        step: f64,
    ) -> DerivativeCheck {
        let hessian = objective
            .evaluate_model(model, Order::Hessian)
            .hessian
            .unwrap_or_default();

        let mut pairs = Vec::with_capacity(hessian.len());
        for k in 0..model.n_params() {
            let plus = gradient_at(objective, &perturbed(model, k, step));
            let minus = gradient_at(objective, &perturbed(model, k, -step));
            let column = (plus - minus) / (2.0 * step);
            pairs.extend(hessian.column(k).iter().copied().zip(column.iter().copied()));
        }

        DerivativeCheck::from_pairs(pairs.into_iter())
    }
}

/// Margin statistics of a fitted model
pub mod stats {
    use super::*;

    /// Slack added to `1 + h` when reporting support vectors. Samples of a
    /// fitted hard-margin model sit at `u_i = 1` only up to solver precision.
    pub const DEFAULT_SUPPORT_TOLERANCE: f64 = 1e-4;

    /// Summary of the margins `u_i` on a dataset
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct MarginSummary {
        /// Samples with `u_i < 1 + h + tolerance`
        pub support_indices: Vec<usize>,
        /// Samples with `u_i < 1`
        pub margin_violations: usize,
        /// Samples with `u_i <= 0`
        pub misclassified: usize,
        pub min_margin: f64,
        pub tolerance: f64,
    }

    impl MarginSummary {
        pub fn support_ratio(&self, n_samples: usize) -> f64 {
            if n_samples == 0 {
                0.0
            } else {
                self.support_indices.len() as f64 / n_samples as f64
            }
        }
    }

    /// Summarize the margins of `model` on the dataset of `objective`
    ///
    /// Unlike [`crate::objective::ActiveSet`], which uses the exact rule
    /// `u_i < 1 + h` for the derivatives, reported support vectors include
    /// samples within `tolerance` of the margin boundary.
    pub fn margin_summary(
        objective: &SvmObjective<'_>,
        model: &LinearModel,
        tolerance: f64,
    ) -> MarginSummary {
        let data: &Dataset = objective.dataset();
        let margins = model.margins(data);
        let bound = 1.0 + objective.loss().width() + tolerance;

        MarginSummary {
            support_indices: margins
                .iter()
                .enumerate()
                .filter(|(_, &u)| u < bound)
                .map(|(i, _)| i)
                .collect(),
            margin_violations: margins.iter().filter(|&&u| u < 1.0).count(),
            misclassified: margins.iter().filter(|&&u| u <= 0.0).count(),
            min_margin: margins.iter().copied().fold(f64::INFINITY, f64::min),
            tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::gradcheck::*;
    use super::stats::*;
    use super::*;
    use crate::core::ObjectiveParams;
    use crate::data::GaussianBlobs;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn blobs() -> Dataset {
        GaussianBlobs::new(40, vec![2.0, 1.0])
            .with_seed(17)
            .generate()
            .unwrap()
    }

    fn objective(data: &Dataset, huber: f64, lambda0: f64) -> SvmObjective<'_> {
        SvmObjective::new(
            data,
            ObjectiveParams {
                lambda: 0.5,
                lambda0,
                huber,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_gradient_check_hinge() {
        let data = blobs();
        let obj = objective(&data, 0.0, 0.0);
        let model = LinearModel::new(array![-0.4, 0.3], Some(0.2));

        let check = check_gradient(&obj, &model, 1e-7);
        assert_eq!(check.n_entries, 3);
        assert!(check.passes(1e-5), "{check:?}");
    }

    #[test]
    fn test_gradient_check_huber_with_positive_bias() {
        let data = blobs();
        let obj = objective(&data, 0.5, 1.5);
        let model = LinearModel::new(array![-0.6, 0.1], Some(0.7));

        let check = check_gradient(&obj, &model, 1e-6);
        assert!(check.passes(1e-6), "{check:?}");
    }

    #[test]
    fn test_hessian_check_huber() {
        let data = blobs();
        let obj = objective(&data, 1.0, 0.5);
        let model = LinearModel::new(array![-0.5, 0.2], Some(0.4));
        assert!(obj.evaluate_model(&model, Order::Value).active.n_quadratic() > 0);

        let check = check_hessian(&obj, &model, 1e-6);
        assert_eq!(check.n_entries, 9);
        assert!(check.passes(1e-4), "{check:?}");
    }

    #[test]
    fn test_margin_summary() {
        let data = Dataset::from_rows(
            array![[2.0], [0.5], [-0.2], [-3.0]],
            array![1.0, 1.0, 1.0, -1.0],
        )
        .unwrap();
        let obj = objective(&data, 0.0, 0.0);
        let model = LinearModel::new(array![1.0], None);

        // margins: 2.0, 0.5, -0.2, 3.0
        let summary = margin_summary(&obj, &model, 0.0);
        assert_eq!(summary.support_indices, vec![1, 2]);
        assert_eq!(summary.margin_violations, 2);
        assert_eq!(summary.misclassified, 1);
        assert_abs_diff_eq!(summary.min_margin, -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.support_ratio(4), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_margin_summary_counts_samples_on_the_margin() {
        // A hard-margin fit: samples 0 and 2 sit exactly (up to rounding) at u = 1
        let data = Dataset::from_rows(
            array![[1.0], [3.0], [-1.0 - 1e-9], [-4.0]],
            array![1.0, 1.0, -1.0, -1.0],
        )
        .unwrap();
        let obj = objective(&data, 0.0, 0.0);
        let model = LinearModel::new(array![1.0], None);

        let active = obj.evaluate_model(&model, Order::Value).active;
        assert_eq!(active.n_support(), 0);

        let exact = margin_summary(&obj, &model, 0.0);
        assert!(exact.support_indices.is_empty());

        let summary = margin_summary(&obj, &model, DEFAULT_SUPPORT_TOLERANCE);
        assert_eq!(summary.support_indices, vec![0, 2]);
        assert_eq!(summary.margin_violations, 0);
        assert_abs_diff_eq!(summary.min_margin, 1.0, epsilon = 1e-12);
        assert_eq!(summary.tolerance, DEFAULT_SUPPORT_TOLERANCE);
    }

    #[test]
    fn test_margin_summary_tolerance_extends_huber_band() {
        let data = Dataset::from_rows(array![[1.5], [1.50005], [1.6]], array![1.0, 1.0, 1.0])
            .unwrap();
        let obj = objective(&data, 0.5, 0.0);
        let model = LinearModel::new(array![1.0], None);

        let summary = margin_summary(&obj, &model, DEFAULT_SUPPORT_TOLERANCE);
        assert_eq!(summary.support_indices, vec![0, 1]);
    }
}
