use serde::{Deserialize, Serialize};

use crate::core::LinearScale;
use crate::error::{ChartError, ChartResult};

/// Scale + translate pair reported by a zoom/pan gesture.
///
/// Screen coordinates map as `x' = x * k + tx`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    #[must_use]
    pub const fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom scale factor must be finite and > 0".to_owned(),
            ));
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom translation must be finite".to_owned(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Pure pan without any magnification.
    #[must_use]
    pub fn is_pan_only(self) -> bool {
        self.k == 1.0 && (self.x != 0.0 || self.y != 0.0)
    }

    #[must_use]
    pub fn apply_x(self, x: f64) -> f64 {
        x * self.k + self.x
    }

    #[must_use]
    pub fn invert_x(self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    /// Restricts the scale factor to `[min_k, max_k]`.
    #[must_use]
    pub fn clamp_scale(self, min_k: f64, max_k: f64) -> Self {
        Self {
            k: self.k.clamp(min_k, max_k.max(min_k)),
            ..self
        }
    }

    /// Scale whose domain is what is visible through this transform.
    pub fn rescale_x(self, scale: LinearScale) -> ChartResult<LinearScale> {
        let (range_start, range_end) = scale.range();
        let domain_start = scale.invert(self.invert_x(range_start));
        let domain_end = scale.invert(self.invert_x(range_end));
        scale.with_domain(domain_start, domain_end)
    }
}

#[cfg(test)]
mod tests {
    use super::ZoomTransform;
    use crate::core::LinearScale;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rescale_with_double_zoom_halves_visible_domain() {
        let base = LinearScale::new(0.0, 100.0)
            .and_then(|s| s.with_range(0.0, 500.0))
            .expect("scale");
        let zoomed = ZoomTransform::new(2.0, -250.0, 0.0)
            .rescale_x(base)
            .expect("rescale");
        let (start, end) = zoomed.domain();
        assert_abs_diff_eq!(start, 25.0);
        assert_abs_diff_eq!(end, 75.0);
        assert_eq!(zoomed.range(), base.range());
    }

    #[test]
    fn pan_only_detection() {
        assert!(ZoomTransform::new(1.0, 12.0, 0.0).is_pan_only());
        assert!(!ZoomTransform::new(1.5, 12.0, 0.0).is_pan_only());
        assert!(!ZoomTransform::IDENTITY.is_pan_only());
    }

    #[test]
    fn clamp_keeps_factor_inside_extent() {
        let t = ZoomTransform::new(25.0, 0.0, 0.0).clamp_scale(1.0, 10.0);
        assert_eq!(t.k, 10.0);
        let t = ZoomTransform::new(0.2, 0.0, 0.0).clamp_scale(1.0, 10.0);
        assert_eq!(t.k, 1.0);
    }

    #[test]
    fn apply_and_invert_are_inverse() {
        let t = ZoomTransform::new(3.0, -40.0, 0.0);
        assert_abs_diff_eq!(t.apply_x(10.0), -10.0);
        assert_abs_diff_eq!(t.invert_x(t.apply_x(123.5)), 123.5);
    }
}
