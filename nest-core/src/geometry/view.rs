use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

/// Uniform pan+zoom mapping between model space (y up) and view space (y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
pub struct ViewTransform {
    /// View-space position of the model origin.
    pub center: R2<f64>,
    /// View units per model unit.
    pub scale: f64,
}

/// Fitted to an 800 x 800 view, until the UI reports its real size.
impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform::fit(Self::DEFAULT_SIZE, Self::DEFAULT_SIZE)
    }
}

impl ViewTransform {
    pub const DEFAULT_SIZE: f64 = 800.;

    /// Centers a `width` x `height` view on the origin, the unit circle
    /// spanning 80% of the shorter side.
    pub fn fit(width: f64, height: f64) -> Self {
        ViewTransform {
            center: R2::new(width / 2., height / 2.),
            scale: width.min(height) / 2.5,
        }
    }

    pub fn to_model(&self, view: R2<f64>) -> R2<f64> {
        let p = (view - self.center) / self.scale;
        R2::new(p.x, -p.y)
    }

    pub fn to_view(&self, model: R2<f64>) -> R2<f64> {
        self.center + R2::new(model.x, -model.y) * self.scale
    }

    /// Length in model units of `px` view units.
    pub fn model_len(&self, px: f64) -> f64 {
        px / self.scale
    }

    /// Zooms by `factor` (in for positive `steps`, out for negative) about a
    /// view-space anchor, which keeps its model position.
    pub fn zoom(&mut self, anchor: R2<f64>, steps: f64, factor: f64) {
        let f = if steps < 0. { 1. / factor } else { factor };
        self.center = anchor * (1. - f) + self.center * f;
        self.scale *= f;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let t = ViewTransform { center: R2::new(400., 300.), scale: 250. };
        let m = R2::new(0.3, -0.7);
        let v = t.to_view(m);
        assert_relative_eq!(v, R2::new(475., 475.), epsilon = 1e-9);
        assert_relative_eq!(t.to_model(v), m, epsilon = 1e-12);
    }

    #[test]
    fn y_is_flipped() {
        let t = ViewTransform { center: R2::new(0., 0.), scale: 1. };
        assert_relative_eq!(t.to_model(R2::new(0., 2.)), R2::new(0., -2.));
    }

    #[test]
    fn fit_keeps_unit_circle_in_view() {
        let t = ViewTransform::fit(800., 600.);
        assert_relative_eq!(t.to_view(R2::new(0., 0.)), R2::new(400., 300.));
        assert_relative_eq!(t.to_view(R2::new(0., 1.)), R2::new(400., 60.));
        assert_relative_eq!(ViewTransform::default().model_len(5.), 5. / 320.);
    }

    #[test]
    fn zoom_keeps_anchor() {
        let mut t = ViewTransform::fit(800., 600.);
        let anchor = R2::new(123., 456.);
        let before = t.to_model(anchor);
        t.zoom(anchor, 1., 1.03125);
        assert_relative_eq!(t.to_model(anchor), before, epsilon = 1e-12);
        assert_relative_eq!(t.scale, 240. * 1.03125);
        t.zoom(anchor, -1., 1.03125);
        assert_relative_eq!(t.scale, 240., epsilon = 1e-9);
    }
}
