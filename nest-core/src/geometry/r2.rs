use std::{ops::{Sub, Mul, Add, Div, Neg}, fmt::{Display, Formatter, self}};
use approx::{AbsDiffEq, RelativeEq};
use nalgebra::Vector2;
use num_traits::Float;

use serde::{Deserialize, Serialize};
use tsify::Tsify;

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize, Tsify)]
pub struct R2<D> {
    pub x: D,
    pub y: D,
}

impl<D> R2<D> {
    pub fn new(x: D, y: D) -> Self {
        R2 { x, y }
    }
}

impl<D: Display> Display for R2<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl<D: Float> R2<D> {
    pub fn norm2(&self) -> D {
        self.x * self.x + self.y * self.y
    }
    pub fn norm(&self) -> D {
        self.norm2().sqrt()
    }
    pub fn distance(&self, o: &R2<D>) -> D {
        (*o - *self).norm()
    }
    /// Unit vector in the same direction; NaN components for the zero vector.
    pub fn unit(&self) -> R2<D> {
        *self / self.norm()
    }
    /// Counter-clockwise perpendicular, `(-y, x)`.
    pub fn perp(&self) -> R2<D> {
        R2 { x: -self.y, y: self.x }
    }
    pub fn midpoint(&self, o: &R2<D>) -> R2<D> {
        let two = D::one() + D::one();
        (*self + *o) / two
    }
    /// Chebyshev (max-coordinate) distance, used to dedupe coincident points.
    pub fn max_abs_diff(&self, o: &R2<D>) -> D {
        (self.x - o.x).abs().max((self.y - o.y).abs())
    }
}

impl From<R2<f64>> for Vector2<f64> {
    fn from(p: R2<f64>) -> Self {
        Vector2::new(p.x, p.y)
    }
}

impl From<Vector2<f64>> for R2<f64> {
    fn from(v: Vector2<f64>) -> Self {
        R2 { x: v.x, y: v.y }
    }
}

impl From<[f64; 2]> for R2<f64> {
    fn from([x, y]: [f64; 2]) -> Self {
        R2 { x, y }
    }
}

impl From<R2<f64>> for [f64; 2] {
    fn from(p: R2<f64>) -> Self {
        [p.x, p.y]
    }
}

impl AbsDiffEq for R2<f64> {
    type Epsilon = f64;
    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for R2<f64> {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }
    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative) && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}

impl<D: Neg<Output = D>> Neg for R2<D> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        R2 { x: -self.x, y: -self.y }
    }
}

impl<D: Add<Output = D>> Add for R2<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<D: Sub<Output = D>> Sub for R2<D> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        R2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<D: Mul<D, Output = D> + Clone> Mul<D> for R2<D> {
    type Output = Self;
    fn mul(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x * rhs.clone(),
            y: self.y * rhs,
        }
    }
}

impl<D: Div<D, Output = D> + Clone> Div<D> for R2<D> {
    type Output = Self;
    fn div(self, rhs: D) -> Self::Output {
        R2 {
            x: self.x / rhs.clone(),
            y: self.y / rhs,
        }
    }
}
