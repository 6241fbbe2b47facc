use log::{info, warn};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{
    error::SceneError,
    monitor::Monitor,
    r2::R2,
    scene::{Mode, Scene},
};

/// Outcome of classifying one point against the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Answers taken, padded with the unset placeholder.
    pub path: String,
    /// Index of the last circle visited.
    pub last_index: usize,
}

impl<M: Monitor> Scene<M> {
    /// Walks the tree for `p` from the root, answering each node with whether
    /// `p` lies strictly inside its circle, until a branch is missing or the
    /// innermost circle is reached.
    ///
    /// The point passes if the walk ends on the innermost circle with `p`
    /// inside it. The circles visited are left shown, each marked opaque iff
    /// `p` was inside.
    pub fn evaluate(&mut self, p: R2<f64>) -> Result<Evaluation, SceneError> {
        self.require_mode(Mode::Test)?;
        let universe = self.registry().get(0).ok_or(SceneError::MissingCircle(0))?;
        if !universe.hit(&p) {
            warn!("{} lies outside {}", p, universe);
            return Err(SceneError::OutsideDomain(p.to_string()));
        }
        self.selection_mut().knots.set_single(p);
        self.start()?;

        let (last_index, inside) = loop {
            let index = self.current_index().ok_or(SceneError::NoCurrentNode)?;
            let center = self.current_node().ok_or(SceneError::NoCurrentNode)?.c;
            let circle = self.registry_mut().get_mut(index).ok_or(SceneError::MissingCircle(index))?;
            circle.c = center;
            circle.visible = true;
            let inside = circle.contains_strict(&p);
            circle.opaque = inside;

            let has_branch = self.current_node().map_or(false, |node| node.child(inside).is_some());
            if !has_branch || self.descend(inside).is_err() {
                break (index, inside);
            }
        };

        let path = self.text_path().to_string();
        let innermost = self.registry().len().saturating_sub(1);
        if inside && last_index == innermost {
            info!("{} passes along {}", p, path);
            Ok(Evaluation { path, last_index })
        } else {
            warn!("bad solution for {} along {} (stopped at C{})", p, path, last_index);
            self.monitor_report_error("Bad solution!");
            Err(SceneError::BadSolution { path })
        }
    }
}
