//! Hinge and Huber-smoothed hinge loss on the margin `u = y (theta^T x + b)`

/// Branch of the loss a margin falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// `u >= 1 + h`: zero loss, no contribution to derivatives
    Inactive,
    /// `1 - h < u < 1 + h`: quadratic Huber band (only when `h > 0`)
    Quadratic,
    /// `u <= 1 - h` (or `u < 1` for the plain hinge): loss `1 - u`
    Linear,
}

/// Hinge loss with its corner replaced by a quadratic band of half-width `h`
///
/// With `h = 0` this is exactly `max(1 - u, 0)`:
///
/// ```text
/// loss(u) = 0                      u >= 1 + h
///         = (1 + h - u)^2 / (4h)   1 - h < u < 1 + h
///         = 1 - u                  u <= 1 - h
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedHinge {
    h: f64,
}

impl SmoothedHinge {
    /// Create the loss with band half-width `h`, which must be `>= 0`
    pub fn new(h: f64) -> Self {
        debug_assert!(h >= 0.0, "huber width must be non-negative");
        Self { h }
    }

    /// Plain, non-smoothed hinge loss
    pub fn hinge() -> Self {
        Self { h: 0.0 }
    }

    pub fn width(&self) -> f64 {
        self.h
    }

    pub fn is_smoothed(&self) -> bool {
        self.h > 0.0
    }

    /// Classify a margin. Boundaries belong to exactly one branch:
    /// `u = 1 + h` is inactive, `u = 1 - h` is linear.
    #[inline]
    pub fn region(&self, u: f64) -> Region {
        if u >= 1.0 + self.h {
            Region::Inactive
        } else if self.h > 0.0 && u > 1.0 - self.h {
            Region::Quadratic
        } else {
            Region::Linear
        }
    }

    #[inline]
    pub fn value(&self, u: f64) -> f64 {
        match self.region(u) {
            Region::Inactive => 0.0,
            Region::Quadratic => {
                let r = 1.0 + self.h - u;
                r * r / (4.0 * self.h)
            }
            Region::Linear => 1.0 - u,
        }
    }

    /// Weight `alpha = -dloss/du` of a sample in the gradient sum
    #[inline]
    pub fn alpha(&self, u: f64) -> f64 {
        match self.region(u) {
            Region::Inactive => 0.0,
            Region::Quadratic => (1.0 + self.h - u) / (2.0 * self.h),
            Region::Linear => 1.0,
        }
    }

    /// `d^2 loss / du^2`, nonzero only inside the band
    #[inline]
    pub fn curvature(&self, u: f64) -> f64 {
        match self.region(u) {
            Region::Quadratic => 1.0 / (2.0 * self.h),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hinge_values() {
        let loss = SmoothedHinge::hinge();
        assert_eq!(loss.value(2.0), 0.0);
        assert_eq!(loss.value(1.0), 0.0);
        assert_eq!(loss.value(0.25), 0.75);
        assert_eq!(loss.value(-1.0), 2.0);
        assert!(!loss.is_smoothed());
    }

    #[test]
    fn test_hinge_regions() {
        let loss = SmoothedHinge::hinge();
        assert_eq!(loss.region(1.0), Region::Inactive);
        assert_eq!(loss.region(0.999), Region::Linear);
        assert_eq!(loss.alpha(0.5), 1.0);
        assert_eq!(loss.alpha(1.5), 0.0);
        assert_eq!(loss.curvature(0.5), 0.0);
    }

    #[test]
    fn test_huber_boundaries_are_assigned_once() {
        let loss = SmoothedHinge::new(0.5);
        assert_eq!(loss.region(1.5), Region::Inactive);
        assert_eq!(loss.region(0.5), Region::Linear);
        assert_eq!(loss.region(1.0), Region::Quadratic);
        assert_eq!(loss.region(0.500001), Region::Quadratic);
        assert_eq!(loss.region(1.499999), Region::Quadratic);
    }

    #[test]
    fn test_huber_continuity_at_band_edges() {
        let h = 0.3;
        let loss = SmoothedHinge::new(h);
        let eps = 1e-9;

        for edge in [1.0 - h, 1.0 + h] {
            assert_abs_diff_eq!(loss.value(edge - eps), loss.value(edge + eps), epsilon = 1e-8);
            assert_abs_diff_eq!(loss.alpha(edge - eps), loss.alpha(edge + eps), epsilon = 1e-6);
        }

        // Inside the band the value matches the closed form
        assert_abs_diff_eq!(loss.value(1.0), h / 4.0, epsilon = 1e-15);
        assert_abs_diff_eq!(loss.alpha(1.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(loss.curvature(1.0), 1.0 / (2.0 * h), epsilon = 1e-12);
    }

    #[test]
    fn test_huber_converges_to_hinge() {
        let hinge = SmoothedHinge::hinge();
        for &u in &[-2.0, 0.0, 0.9, 1.0, 1.1, 3.0] {
            let smoothed = SmoothedHinge::new(1e-9);
            assert_abs_diff_eq!(smoothed.value(u), hinge.value(u), epsilon = 1e-8);
        }
    }

    #[test]
    fn test_alpha_matches_numeric_derivative() {
        let loss = SmoothedHinge::new(0.4);
        let step = 1e-6;
        for &u in &[0.0, 0.7, 0.9, 1.2, 1.39, 2.0] {
            let numeric = -(loss.value(u + step) - loss.value(u - step)) / (2.0 * step);
            assert_abs_diff_eq!(loss.alpha(u), numeric, epsilon = 1e-6);
        }
    }
}
