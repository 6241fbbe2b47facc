//! Center placement constructions relative to two marked points.

use nalgebra::{Matrix2, Vector2};

use crate::{intersect::EPS, r2::R2};

/// Point at distance `r` from both `p1` and `p2`.
///
/// The result sits on the perpendicular bisector of `p1 p2`, on the left of the
/// direction `p1 -> p2`. Swapping the arguments yields the mirror solution.
/// `None` when the chord is longer than the diameter.
pub fn place_on_chord(p1: R2<f64>, p2: R2<f64>, r: f64) -> Option<R2<f64>> {
    let delta = p2 - p1;
    let dq = delta.norm2();
    let h2 = r * r - dq / 4.;
    if h2 < -EPS {
        return None;
    }
    let n = delta.unit().perp();
    let h = h2.max(0.).sqrt();
    Some(p1.midpoint(&p2) + n * h)
}

/// Maps `offset` from the frame anchored at the midpoint of `p1 p2` into model space.
///
/// The frame's x axis runs along `p1 -> p2`, its y axis is the left normal, or
/// the right normal when `invert` is set.
pub fn place_in_local_frame(p1: R2<f64>, p2: R2<f64>, offset: R2<f64>, invert: bool) -> R2<f64> {
    let forward = (p2 - p1).unit();
    let normal = if invert { -forward.perp() } else { forward.perp() };
    let frame = Matrix2::from_columns(&[Vector2::from(forward), Vector2::from(normal)]);
    let origin: Vector2<f64> = p1.midpoint(&p2).into();
    (origin + frame * Vector2::from(offset)).into()
}
