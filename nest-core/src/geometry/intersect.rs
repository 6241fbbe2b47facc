use log::trace;

use crate::r2::R2;

/// Tolerance for tangency and reach tests.
pub const EPS: f64 = 1e-7;

/// Intersection points of two circles.
///
/// Returns no points when the circles are too far apart or one lies strictly
/// inside the other (with [`EPS`] slack, so touching circles still count), a
/// single point when they are tangent, and two points otherwise. The two
/// points are ordered `+h` then `-h` along the left normal of `c1 -> c2`.
///
/// Concentric circles have no well-defined intersection and yield nothing.
pub fn intersect_circles(c1: R2<f64>, r1: f64, c2: R2<f64>, r2: f64) -> Vec<R2<f64>> {
    let delta = c2 - c1;
    let d2 = delta.norm2();
    let d = d2.sqrt();
    if d <= EPS || d < (r2 - r1).abs() - EPS || d > r1 + r2 + EPS {
        return vec![];
    }
    let u = delta / d;
    let n = u.perp();
    let a = (r1 * r1 - r2 * r2 + d2) / (2. * d);
    // Slightly negative under the tolerance above; clamp into tangency.
    let h = (r1 * r1 - a * a).max(0.).sqrt();
    let base = c1 + u * a;
    trace!("intersect {} r={} with {} r={}: a={}, h={}", c1, r1, c2, r2, a, h);
    if h.abs() <= EPS {
        vec![base]
    } else {
        vec![base + n * h, base - n * h]
    }
}
