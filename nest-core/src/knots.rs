use itertools::Itertools;

use crate::{circle::Circle, intersect::{intersect_circles, EPS}, r2::R2};

/// Construction points: up to two selected knots plus the candidate knots
/// (intersections of the visible circles) they are picked from.
///
/// Knots are plain points; a selected knot stays put when circles move, and
/// candidates are rebuilt from scratch by [`Knots::recompute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Knots {
    first: Option<R2<f64>>,
    second: Option<R2<f64>>,
    candidates: Vec<R2<f64>>,
}

impl Knots {
    pub fn first(&self) -> Option<R2<f64>> {
        self.first
    }

    pub fn second(&self) -> Option<R2<f64>> {
        self.second
    }

    pub fn candidates(&self) -> &[R2<f64>] {
        &self.candidates
    }

    pub fn selected_count(&self) -> usize {
        self.first.iter().chain(self.second.iter()).count()
    }

    /// Both selected knots, in selection order.
    pub fn pair(&self) -> Option<(R2<f64>, R2<f64>)> {
        self.first.zip(self.second)
    }

    /// Selected knots followed by candidates.
    pub fn all(&self) -> impl Iterator<Item = R2<f64>> + '_ {
        self.first.into_iter().chain(self.second).chain(self.candidates.iter().copied())
    }

    pub fn clear_selection(&mut self) {
        self.first = None;
        self.second = None;
    }

    pub fn clear(&mut self) {
        self.clear_selection();
        self.candidates.clear();
    }

    /// Replaces everything with a single selected knot.
    pub fn set_single(&mut self, p: R2<f64>) {
        self.first = Some(p);
        self.second = None;
        self.candidates.clear();
    }

    /// Nearest knot within `tolerance` of `p`, selected knots first.
    pub fn pick(&self, p: &R2<f64>, tolerance: f64) -> Option<R2<f64>> {
        self.all()
            .filter(|k| k.distance(p) < tolerance)
            .min_by(|a, b| a.distance(p).total_cmp(&b.distance(p)))
    }

    /// Clicks `knot`: deselects it if selected, otherwise adds it to the
    /// selection, starting over once two are already selected.
    pub fn toggle(&mut self, knot: R2<f64>) {
        let same = |k: Option<R2<f64>>| k.map_or(false, |k| k.max_abs_diff(&knot) < EPS);
        if same(self.second) {
            self.second = None;
        } else if same(self.first) {
            self.first = self.second.take();
        } else if self.second.is_some() {
            self.first = Some(knot);
            self.second = None;
        } else if self.first.is_some() {
            self.second = Some(knot);
        } else {
            self.first = Some(knot);
        }
    }

    fn is_selected(&self, p: &R2<f64>) -> bool {
        self.first.iter().chain(self.second.iter()).any(|k| k.max_abs_diff(p) < EPS)
    }

    /// Rebuilds the candidates from pairwise intersections of `circles`,
    /// skipping points that coincide with a selected knot.
    pub fn recompute<'a>(&mut self, circles: impl Iterator<Item = &'a Circle> + Clone) {
        let points: Vec<R2<f64>> = circles
            .tuple_combinations()
            .flat_map(|(a, b)| intersect_circles(a.c, a.r, b.c, b.r))
            .collect();
        self.candidates = points.into_iter().filter(|p| !self.is_selected(p)).collect();
    }
}
