//! Plane geometry: points, circles, intersections, center constructions and
//! the model/view transform.

pub mod circle;
pub mod intersect;
pub mod place;
pub mod r2;
pub mod view;
