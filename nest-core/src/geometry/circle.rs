use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{intersect::EPS, r2::R2};

/// A registry circle: geometry plus the participation and rendering flags the
/// scene toggles while navigating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct Circle {
    pub index: usize,
    pub c: R2<f64>,
    pub r: f64,
    /// May be grabbed and dragged.
    pub enabled: bool,
    /// Drawn, and included in knot computation.
    pub visible: bool,
    /// Drawn in its own color rather than greyed out.
    pub opaque: bool,
    /// Interior is shaded.
    pub filled: bool,
}

impl Circle {
    pub fn new(index: usize, c: R2<f64>, r: f64) -> Self {
        Circle { index, c, r, enabled: true, visible: true, opaque: true, filled: false }
    }

    pub fn is_universe(&self) -> bool {
        self.index == 0
    }

    /// Geometric containment; the boundary counts as outside.
    pub fn contains_strict(&self, p: &R2<f64>) -> bool {
        self.c.distance(p) < self.r
    }

    /// Containment with a small outward tolerance, so boundary points count as inside.
    pub fn hit(&self, p: &R2<f64>) -> bool {
        self.c.distance(p) < self.r + EPS
    }

    /// Whether `p` lies within `tolerance` of the outline.
    pub fn ring_hit(&self, p: &R2<f64>, tolerance: f64) -> bool {
        (self.c.distance(p) - self.r).abs() < tolerance
    }

    /// Recenters the circle so its outline passes through `p`, keeping the
    /// direction from `p` to the center. A center sitting exactly on `p` is left as is.
    pub fn pin_to(&mut self, p: R2<f64>) {
        let d = self.c.distance(&p);
        if d > 0. {
            self.c = p + (self.c - p) / d * self.r;
        }
    }
}

impl Display for Circle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}({:.3}, {:.3}, {:.3})", self.index, self.c.x, self.c.y, self.r)
    }
}
