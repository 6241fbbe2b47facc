use log::debug;

use crate::{circle::Circle, r2::R2};

/// Index-addressed collection of the scene's circles.
///
/// Index 0 is the universe circle, the rest are working circles in creation
/// order. Indices are never reused while the registry is populated; a removed
/// circle leaves an empty slot behind until the trailing slots are all empty.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: Vec<Option<Circle>>,
    len: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a circle with the next sequential index and returns that index.
    pub fn create_circle(&mut self, c: R2<f64>, r: f64) -> usize {
        let index = self.slots.len();
        let circle = Circle::new(index, c, r);
        debug!("create {}", circle);
        self.slots.push(Some(circle));
        self.len += 1;
        index
    }

    pub fn remove_circle(&mut self, index: usize) -> Option<Circle> {
        let removed = self.slots.get_mut(index).and_then(Option::take);
        if let Some(circle) = &removed {
            debug!("remove {}", circle);
            self.len -= 1;
            while matches!(self.slots.last(), Some(None)) {
                self.slots.pop();
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        for index in (0..self.slots.len()).rev() {
            self.remove_circle(index);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&Circle> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Circle> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Circles in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Circle> + Clone {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Circle> {
        self.slots.iter_mut().flatten()
    }

    /// Radii of all circles, in index order.
    pub fn radii(&self) -> Vec<f64> {
        self.iter().map(|c| c.r).collect()
    }

    /// Radii of the working circles (everything but the universe), in index order.
    pub fn working_radii(&self) -> Vec<f64> {
        self.iter().filter(|c| !c.is_universe()).map(|c| c.r).collect()
    }

    /// Number of decision levels: every working circle but the innermost.
    pub fn max_depth(&self) -> usize {
        self.len.saturating_sub(2)
    }
}
