use derive_more::Display;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::{
    circle::Circle,
    config::SceneConfig,
    error::SceneError,
    evaluate::Evaluation,
    knots::Knots,
    monitor::Monitor,
    place::{place_in_local_frame, place_on_chord},
    r2::R2,
    registry::Registry,
    tree::TreeNode,
    view::ViewTransform,
    walk::{TextPath, Walk},
};

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
pub enum Mode {
    /// Circles move freely; no tree node is active.
    #[default]
    #[display(fmt = "Free")]
    Free,
    /// Building the tree: the current node's circle is placed by hand.
    #[display(fmt = "Tree")]
    Tree,
    /// Classifying points against the built tree.
    #[display(fmt = "Test")]
    Test,
}

/// Circle held by the pointer, and the last pointer position it was moved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    pub index: usize,
    pub prev: R2<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub knots: Knots,
    pub grab: Option<Grab>,
}

impl Selection {
    pub fn clear(&mut self) {
        self.knots.clear_selection();
        self.grab = None;
    }
}

/// The navigation engine: circles, the decision tree, the walk through it and
/// the pointer selection, all driven by one owner.
///
/// Every mutating operation finishes with a refresh that syncs the current
/// node's center from its circle, recomputes the rendering flags and reports
/// the text path to the monitor.
#[derive(Debug)]
pub struct Scene<M: Monitor = ()> {
    config: SceneConfig,
    registry: Registry,
    root: Option<TreeNode>,
    walk: Option<Walk>,
    mode: Mode,
    selection: Selection,
    view: ViewTransform,
    filled_area: bool,
    monitor: M,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Scene::with_monitor(config, ())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(SceneConfig::default())
    }
}

impl<M: Monitor> Scene<M> {
    pub fn with_monitor(config: SceneConfig, monitor: M) -> Self {
        let mut scene = Scene {
            config: config.clone(),
            registry: Registry::new(),
            root: None,
            walk: None,
            mode: Mode::Free,
            selection: Selection::default(),
            view: ViewTransform::default(),
            filled_area: false,
            monitor,
        };
        scene.init(config);
        scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn monitor(&self) -> &M {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut M {
        &mut self.monitor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn knots(&self) -> &Knots {
        &self.selection.knots
    }

    pub fn grabbed(&self) -> Option<usize> {
        self.selection.grab.map(|g| g.index)
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn walk(&self) -> Option<&Walk> {
        self.walk.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn to_model(&self, view: R2<f64>) -> R2<f64> {
        self.view.to_model(view)
    }

    pub fn to_view(&self, model: R2<f64>) -> R2<f64> {
        self.view.to_view(model)
    }

    pub fn filled_area(&self) -> bool {
        self.filled_area
    }

    pub fn set_filled_area(&mut self, filled_area: bool) {
        self.filled_area = filled_area;
        self.refresh();
    }

    /// Number of decision levels (circle count minus two).
    pub fn max_depth(&self) -> usize {
        self.registry.max_depth()
    }

    pub fn current_node(&self) -> Option<&TreeNode> {
        self.walk.as_ref()?.current(self.root.as_ref()?)
    }

    /// Circle index bound to the current node.
    pub fn current_index(&self) -> Option<usize> {
        self.walk.as_ref().map(|walk| walk.depth() + 1)
    }

    pub fn is_current_fixed(&self) -> bool {
        self.current_node().map_or(false, |node| node.fixed)
    }

    pub fn text_path(&self) -> TextPath {
        let len = self.max_depth();
        match &self.walk {
            Some(walk) => walk.text_path(len),
            None => TextPath::new(&[], len),
        }
    }

    /// Open positions of the committed tree, padded to the decision depth.
    pub fn open_paths(&self) -> Vec<String> {
        self.root.as_ref().map(|root| root.open_paths(self.max_depth())).unwrap_or_default()
    }

    /// Clears the scene and creates the configured circles, all at the origin.
    pub fn init(&mut self, config: SceneConfig) {
        self.clear();
        self.config = config;
        self.registry.create_circle(R2::default(), self.config.universe_radius);
        for r in &self.config.radii {
            self.registry.create_circle(R2::default(), *r);
        }
        self.mode = Mode::Free;
        info!("init: {} circles, {} decision levels", self.registry.len(), self.max_depth());
        self.recompute_knots();
    }

    /// Removes every circle along with the tree, the walk and the selection.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.root = None;
        self.walk = None;
        self.selection = Selection::default();
        self.recompute_knots();
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), SceneError> {
        self.selection.clear();
        let prev = self.mode;
        self.mode = mode;
        debug!("mode {} -> {}", prev, mode);
        match (prev, mode) {
            (Mode::Test, Mode::Tree) if self.walk.is_some() => {
                if let Some(circle) = self.current_index().and_then(|i| self.registry.get_mut(i)) {
                    circle.enabled = true;
                }
                self.recompute_knots();
                Ok(())
            }
            (_, Mode::Free) => {
                self.walk = None;
                for circle in self.registry.iter_mut() {
                    circle.visible = true;
                    circle.enabled = true;
                }
                self.recompute_knots();
                Ok(())
            }
            _ => self.start(),
        }
    }

    /// Puts the walk back at the root, creating the root (bound to circle 1,
    /// at that circle's center) if there is none yet.
    pub fn start(&mut self) -> Result<(), SceneError> {
        if self.mode == Mode::Free {
            return Err(SceneError::WrongMode { expected: Mode::Tree, actual: Mode::Free });
        }
        let center = self.registry.get(1).ok_or(SceneError::MissingCircle(1))?.c;
        let root = self.root.get_or_insert_with(|| TreeNode::new(1, center));
        let center = root.c;
        self.walk = Some(Walk::new());
        for circle in self.registry.iter_mut() {
            match self.mode {
                Mode::Test => {
                    circle.visible = circle.index == 0;
                    circle.enabled = false;
                }
                _ => {
                    circle.visible = circle.index <= 1;
                    circle.enabled = circle.index == 1;
                }
            }
            if circle.index == 1 {
                circle.c = center;
            }
        }
        debug!("start in {} mode", self.mode);
        self.recompute_knots();
        Ok(())
    }

    /// Steps to the `answer` child of the current node, following a committed
    /// branch where one exists and creating a tentative node otherwise.
    pub fn descend(&mut self, answer: bool) -> Result<(), SceneError> {
        let depth = self.walk.as_ref().ok_or(SceneError::NoCurrentNode)?.depth();
        let max_depth = self.max_depth();
        if depth >= max_depth {
            return Err(SceneError::DepthLimit(max_depth));
        }
        let index = depth + 1;
        let next = index + 1;
        let fresh_center = self.registry.get(next).ok_or(SceneError::MissingCircle(next))?.c;

        self.sync_current();
        if let Some(circle) = self.registry.get_mut(index) {
            circle.enabled = false;
            circle.visible = true;
        }
        let (root, walk) = self.parts()?;
        let followed = walk.push(root, answer, || TreeNode::new(next, fresh_center));
        let center = walk.current(root).map(|node| node.c).ok_or(SceneError::NoCurrentNode)?;
        let circle = self.registry.get_mut(next).ok_or(SceneError::MissingCircle(next))?;
        circle.c = center;
        circle.enabled = true;
        circle.visible = true;
        debug!("descend {} -> C{} ({})", answer as u8, next, if followed { "linked" } else { "tentative" });

        if self.mode != Mode::Test {
            self.selection.knots.clear_selection();
        }
        self.recompute_knots();
        Ok(())
    }

    /// Steps back to the parent node; exact inverse of [`Scene::descend`].
    pub fn ascend(&mut self) -> Result<(), SceneError> {
        let depth = self.walk.as_ref().ok_or(SceneError::NoCurrentNode)?.depth();
        if depth == 0 {
            return Err(SceneError::AtRoot);
        }
        let index = depth + 1;
        self.sync_current();
        if let Some(circle) = self.registry.get_mut(index) {
            circle.visible = false;
            circle.enabled = false;
        }
        if let Some(walk) = self.walk.as_mut() {
            walk.pop();
        }
        let center = self.current_node().map(|node| node.c).ok_or(SceneError::NoCurrentNode)?;
        let parent = self.registry.get_mut(index - 1).ok_or(SceneError::MissingCircle(index - 1))?;
        parent.c = center;
        parent.enabled = true;
        debug!("ascend C{} -> C{}", index, index - 1);

        if self.mode != Mode::Test {
            self.selection.knots.clear_selection();
        }
        self.recompute_knots();
        Ok(())
    }

    /// Swaps the current node for its sibling.
    pub fn invert(&mut self) -> Result<(), SceneError> {
        let answer = self
            .walk
            .as_ref()
            .ok_or(SceneError::NoCurrentNode)?
            .last_answer()
            .ok_or(SceneError::AtRoot)?;
        self.ascend()?;
        self.descend(!answer)
    }

    /// Restarts from the root and descends along the `'0'`/`'1'` characters
    /// of `path`, skipping anything else.
    pub fn replay_path(&mut self, path: &str) -> Result<(), SceneError> {
        if self.root.is_none() {
            return Err(SceneError::NoTree);
        }
        self.start()?;
        for ch in path.chars() {
            match ch {
                '0' => self.descend(false)?,
                '1' => self.descend(true)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Makes the current walk permanent.
    pub fn commit(&mut self) -> Result<(), SceneError> {
        self.sync_current();
        let (root, walk) = self.parts()?;
        walk.commit(root);
        self.refresh();
        Ok(())
    }

    /// Discards the current node's subtree and replaces it with a fresh
    /// tentative node; at the root, discards the whole tree.
    pub fn reset(&mut self) -> Result<(), SceneError> {
        if self.mode != Mode::Tree {
            return Ok(());
        }
        let last = match &self.walk {
            Some(walk) => walk.last_answer(),
            None => return Ok(()),
        };
        match last {
            Some(answer) => {
                self.ascend()?;
                let (root, walk) = self.parts()?;
                if let Some(node) = walk.current_mut(root) {
                    if let Some(dropped) = node.detach(answer) {
                        info!("reset: dropped {} node(s) under {}", dropped.size(), answer as u8);
                    }
                }
                self.descend(answer)
            }
            None => {
                info!("reset: dropped the whole tree");
                self.root = None;
                if let Some(circle) = self.registry.get_mut(1) {
                    circle.c = R2::default();
                }
                self.start()
            }
        }
    }

    /// Moves the current circle's center to `p`.
    pub fn place_to_point(&mut self, p: R2<f64>) -> Result<(), SceneError> {
        let circle = self.current_circle_mut()?;
        circle.c = p;
        self.recompute_knots();
        Ok(())
    }

    /// Places the current circle at `offset` in the frame spanned by the two
    /// selected knots (see [`place_in_local_frame`]).
    pub fn place_to_local(&mut self, offset: R2<f64>, invert: bool) -> Result<(), SceneError> {
        self.require_mode(Mode::Tree)?;
        let (p1, p2) = self.selection.knots.pair().ok_or(SceneError::MissingKnots {
            needed: 2,
            found: self.selection.knots.selected_count(),
        })?;
        let center = place_in_local_frame(p1, p2, offset, invert);
        self.current_circle_mut()?.c = center;
        self.recompute_knots();
        Ok(())
    }

    /// Centers the current circle on the single selected knot, or places it so
    /// its outline passes through both selected knots.
    pub fn place_to_chord(&mut self, invert: bool) -> Result<(), SceneError> {
        self.require_mode(Mode::Tree)?;
        let knots = &self.selection.knots;
        let center = match (knots.first(), knots.second()) {
            (Some(p1), None) => p1,
            (Some(p1), Some(p2)) => {
                let (p1, p2) = if invert { (p2, p1) } else { (p1, p2) };
                let r = self.current_circle_mut()?.r;
                match place_on_chord(p1, p2, r) {
                    Some(center) => center,
                    None => {
                        warn!("chord {} {} is longer than the diameter {}", p1, p2, 2. * r);
                        return Err(SceneError::NoSolution);
                    }
                }
            }
            _ => return Err(SceneError::MissingKnots { needed: 1, found: 0 }),
        };
        self.current_circle_mut()?.c = center;
        self.recompute_knots();
        Ok(())
    }

    /// Pointer press at model-space `p`.
    ///
    /// In [`Mode::Test`] the point is evaluated. Otherwise a knot under the
    /// pointer toggles its selection, failing that an enabled circle outline
    /// under the pointer is grabbed, and failing both the selection is cleared.
    pub fn press(&mut self, p: R2<f64>) -> Result<Option<Evaluation>, SceneError> {
        self.monitor.report_position(p, true);
        if self.mode == Mode::Test {
            return self.evaluate(p).map(Some);
        }
        let knot_tolerance = self.view.model_len(self.config.knot_pick_px);
        if let Some(knot) = self.selection.knots.pick(&p, knot_tolerance) {
            self.selection.knots.toggle(knot);
            self.recompute_knots();
            return Ok(None);
        }
        let ring_tolerance = self.view.model_len(self.config.ring_pick_px);
        let ring_distance = |c: &Circle| (c.c.distance(&p) - c.r).abs();
        let grabbed = self
            .registry
            .iter()
            .filter(|c| c.enabled && c.visible && c.ring_hit(&p, ring_tolerance))
            .min_by(|a, b| ring_distance(*a).total_cmp(&ring_distance(*b)))
            .map(|c| c.index);
        match grabbed {
            Some(index) => {
                debug!("grab C{}", index);
                self.selection.grab = Some(Grab { index, prev: p });
                if self.selection.knots.pair().is_some() {
                    self.selection.knots.clear_selection();
                }
                self.recompute_knots();
            }
            None => {
                self.selection.clear();
                self.recompute_knots();
            }
        }
        Ok(None)
    }

    /// Pointer move to model-space `p`: drags the grabbed circle, keeping its
    /// outline on the selected knot when exactly one is selected.
    pub fn drag(&mut self, p: R2<f64>) {
        self.monitor.report_position(p, false);
        if self.mode == Mode::Test {
            return;
        }
        let (index, delta) = match self.selection.grab.as_mut() {
            Some(grab) => {
                let delta = p - grab.prev;
                grab.prev = p;
                (grab.index, delta)
            }
            None => return,
        };
        let pin = match (self.selection.knots.first(), self.selection.knots.second()) {
            (Some(knot), None) => Some(knot),
            _ => None,
        };
        if let Some(circle) = self.registry.get_mut(index) {
            circle.c = circle.c + delta;
            if let Some(knot) = pin {
                circle.pin_to(knot);
            }
        }
        self.recompute_knots();
    }

    pub fn release(&mut self) {
        if let Some(grab) = self.selection.grab.take() {
            debug!("release C{}", grab.index);
        }
        self.refresh();
    }

    /// Zooms about a view-space anchor; positive `steps` zoom in.
    pub fn zoom(&mut self, anchor: R2<f64>, steps: f64) {
        self.view.zoom(anchor, steps, self.config.zoom_factor);
    }

    /// Rebuilds the candidate knots from the visible circles, then refreshes.
    /// In [`Mode::Test`] only the selected knots exist.
    pub fn recompute_knots(&mut self) {
        let knots = &mut self.selection.knots;
        match self.mode {
            Mode::Test => knots.recompute(std::iter::empty()),
            _ => knots.recompute(self.registry.iter().filter(|c| c.visible)),
        }
        self.refresh();
    }

    /// Syncs the current node from its circle, recomputes the `opaque` and
    /// `filled` flags, and reports the text path.
    pub fn refresh(&mut self) {
        self.sync_current();
        let path = self.text_path();
        if self.walk.is_some() {
            for (i, slot) in path.iter().enumerate() {
                if let Some(circle) = self.registry.get_mut(i + 1) {
                    let outside = *slot == Some(false);
                    circle.opaque = !outside;
                    circle.filled = outside && self.filled_area;
                }
            }
        } else {
            let grabbed = self.grabbed();
            for circle in self.registry.iter_mut() {
                circle.opaque = grabbed.map_or(true, |index| index == circle.index);
                circle.filled = false;
            }
        }
        let fixed = self.is_current_fixed();
        self.monitor.report_path(&path.to_string(), fixed);
    }

    pub(crate) fn require_mode(&self, expected: Mode) -> Result<(), SceneError> {
        if self.mode == expected {
            Ok(())
        } else {
            warn!("operation needs {} mode, scene is in {} mode", expected, self.mode);
            Err(SceneError::WrongMode { expected, actual: self.mode })
        }
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub(crate) fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub(crate) fn monitor_report_error(&mut self, message: &str) {
        self.monitor.report_error(message);
    }

    pub(crate) fn replace_tree(&mut self, root: Option<TreeNode>) {
        self.root = root;
        self.walk = None;
    }

    pub(crate) fn set_mode_quiet(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Tree mode's current circle.
    fn current_circle_mut(&mut self) -> Result<&mut Circle, SceneError> {
        self.require_mode(Mode::Tree)?;
        let index = self.current_index().ok_or(SceneError::NoCurrentNode)?;
        self.registry.get_mut(index).ok_or(SceneError::MissingCircle(index))
    }

    /// Copies the current circle's live center into the current node.
    fn sync_current(&mut self) {
        let center = match self.current_index().and_then(|index| self.registry.get(index)) {
            Some(circle) => circle.c,
            None => return,
        };
        if let (Some(root), Some(walk)) = (self.root.as_mut(), self.walk.as_mut()) {
            if let Some(node) = walk.current_mut(root) {
                node.c = center;
            }
        }
    }

    fn parts(&mut self) -> Result<(&mut TreeNode, &mut Walk), SceneError> {
        match (self.root.as_mut(), self.walk.as_mut()) {
            (Some(root), Some(walk)) => Ok((root, walk)),
            _ => Err(SceneError::NoCurrentNode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::EventLog;
    use test_log::test;

    fn tree_scene() -> Scene<EventLog> {
        let mut scene = Scene::with_monitor(SceneConfig::default(), EventLog::new());
        scene.set_view(ViewTransform::fit(800., 800.));
        scene.set_mode(Mode::Tree).unwrap();
        scene
    }

    fn circles<M: Monitor>(scene: &Scene<M>) -> Vec<Circle> {
        scene.registry().iter().cloned().collect()
    }

    fn center<M: Monitor>(scene: &Scene<M>, index: usize) -> R2<f64> {
        scene.registry().get(index).unwrap().c
    }

    #[test]
    fn init_creates_configured_circles() {
        let scene = Scene::default();
        assert_eq!(scene.registry().len(), 9);
        assert_eq!(scene.max_depth(), 7);
        assert_eq!(scene.mode(), Mode::Free);
        assert!(scene.current_index().is_none());
        assert!(scene.root().is_none());
        assert!(scene.open_paths().is_empty());
        assert_eq!(scene.text_path().to_string(), "xxxxxxx");
    }

    #[test]
    fn start_in_tree_mode() {
        let scene = tree_scene();
        assert_eq!(scene.current_index(), Some(1));
        assert_eq!(scene.text_path().to_string(), "xxxxxxx");
        let universe = scene.registry().get(0).unwrap();
        assert!(universe.visible && !universe.enabled);
        let first = scene.registry().get(1).unwrap();
        assert!(first.visible && first.enabled);
        assert!(scene.registry().iter().skip(2).all(|c| !c.visible && !c.enabled));
        assert_eq!(scene.monitor().last_path(), Some(("xxxxxxx", false)));
        assert_eq!(scene.open_paths(), vec!["xxxxxxx"]);
    }

    #[test]
    fn descend_then_ascend_is_identity() {
        let mut scene = tree_scene();
        scene.place_to_point(R2::new(0.1, 0.)).unwrap();
        scene.descend(true).unwrap();
        scene.place_to_point(R2::new(0.05, 0.02)).unwrap();

        let before = (circles(&scene), scene.text_path(), scene.knots().clone(), scene.current_index());
        scene.descend(false).unwrap();
        assert_eq!(scene.text_path().to_string(), "10xxxxx");
        assert_eq!(scene.current_index(), Some(3));
        assert!(!scene.registry().get(2).unwrap().enabled);
        scene.ascend().unwrap();
        let after = (circles(&scene), scene.text_path(), scene.knots().clone(), scene.current_index());
        assert_eq!(before, after);
    }

    #[test]
    fn deep_round_trip_through_committed_nodes() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.place_to_point(R2::new(0.1, 0.)).unwrap();
        scene.descend(false).unwrap();
        scene.place_to_point(R2::new(0.05, 0.02)).unwrap();
        scene.commit().unwrap();
        scene.ascend().unwrap();
        scene.ascend().unwrap();

        let snapshot = |scene: &Scene<EventLog>| {
            (circles(scene), scene.text_path(), scene.knots().clone(), scene.current_index(), scene.root().cloned())
        };
        let before = snapshot(&scene);
        for answer in [true, false, true, false] {
            scene.descend(answer).unwrap();
        }
        assert_eq!(scene.text_path().to_string(), "1010xxx");
        assert_eq!(scene.walk().map(|w| w.linked()), Some(2));
        assert!(!scene.is_current_fixed());
        for _ in 0..4 {
            scene.ascend().unwrap();
        }
        assert_eq!(snapshot(&scene), before);
    }

    #[test]
    fn default_view_picks_in_pixels() {
        let mut scene = Scene::default();
        assert_eq!(scene.view(), &ViewTransform::default());
        // Halfway between the 0.2 and 0.3 outlines: too far from both.
        scene.press(R2::new(0.25, 0.)).unwrap();
        assert_eq!(scene.grabbed(), None);
        scene.press(R2::new(0.29, 0.)).unwrap();
        assert_eq!(scene.grabbed(), Some(7));
    }

    #[test]
    fn tentative_node_keeps_moved_center() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.place_to_point(R2::new(0.2, 0.)).unwrap();
        scene.ascend().unwrap();
        scene.place_to_point(R2::new(-0.1, 0.)).unwrap();
        assert_eq!(scene.root().unwrap().c, R2::new(-0.1, 0.));
        // The dropped tentative node's circle stays where it was left.
        scene.descend(true).unwrap();
        assert_eq!(center(&scene, 2), R2::new(0.2, 0.));
    }

    #[test]
    fn depth_limit() {
        let mut scene = tree_scene();
        for _ in 0..7 {
            scene.descend(true).unwrap();
        }
        assert_eq!(scene.current_index(), Some(8));
        assert_eq!(scene.descend(true), Err(SceneError::DepthLimit(7)));
        assert_eq!(scene.descend(false), Err(SceneError::DepthLimit(7)));
        assert_eq!(scene.text_path().to_string(), "1111111");
    }

    #[test]
    fn ascend_at_root() {
        let mut scene = tree_scene();
        assert_eq!(scene.ascend(), Err(SceneError::AtRoot));
        assert_eq!(scene.invert(), Err(SceneError::AtRoot));
    }

    #[test]
    fn no_walk_in_free_mode() {
        let mut scene = Scene::default();
        assert_eq!(scene.descend(true), Err(SceneError::NoCurrentNode));
        assert_eq!(scene.ascend(), Err(SceneError::NoCurrentNode));
        assert_eq!(scene.commit(), Err(SceneError::NoCurrentNode));
        assert_eq!(
            scene.place_to_point(R2::new(0.1, 0.1)),
            Err(SceneError::WrongMode { expected: Mode::Tree, actual: Mode::Free })
        );
        assert_eq!(scene.replay_path("01"), Err(SceneError::NoTree));
        assert_eq!(scene.reset(), Ok(()));
    }

    #[test]
    fn commit_is_idempotent() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.descend(false).unwrap();
        assert!(!scene.is_current_fixed());
        scene.commit().unwrap();
        assert!(scene.is_current_fixed());
        assert_eq!(scene.monitor().last_path(), Some(("10xxxxx", true)));
        let once = scene.root().cloned();
        scene.commit().unwrap();
        assert_eq!(scene.root().cloned(), once);
        assert_eq!(scene.root().unwrap().size(), 3);
        assert_eq!(scene.open_paths(), vec!["0xxxxxx", "100xxxx", "101xxxx", "11xxxxx"]);
    }

    #[test]
    fn open_paths_lead_to_open_slots() {
        let mut scene = tree_scene();
        scene.descend(false).unwrap();
        scene.commit().unwrap();
        for path in scene.open_paths() {
            scene.replay_path(&path).unwrap();
            assert!(!scene.is_current_fixed(), "{} ends on a committed node", path);
        }
    }

    #[test]
    fn committed_branches_are_followed() {
        let mut scene = tree_scene();
        scene.descend(false).unwrap();
        scene.place_to_point(R2::new(0.3, 0.3)).unwrap();
        scene.commit().unwrap();
        scene.ascend().unwrap();
        scene.place_to_point(R2::new(0.5, 0.)).unwrap();
        scene.descend(false).unwrap();
        assert!(scene.is_current_fixed());
        assert_eq!(center(&scene, 2), R2::new(0.3, 0.3));
        assert_eq!(scene.walk().unwrap().linked(), 1);
    }

    #[test]
    fn invert_switches_sibling() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.descend(true).unwrap();
        scene.invert().unwrap();
        assert_eq!(scene.text_path().to_string(), "10xxxxx");
        assert_eq!(scene.current_index(), Some(3));
    }

    #[test]
    fn replay_path_skips_other_characters() {
        let mut scene = tree_scene();
        scene.replay_path("1x0-1").unwrap();
        assert_eq!(scene.text_path().to_string(), "101xxxx");
        scene.replay_path("").unwrap();
        assert_eq!(scene.current_index(), Some(1));
        assert_eq!(scene.replay_path("11111111"), Err(SceneError::DepthLimit(7)));
        assert_eq!(scene.text_path().to_string(), "1111111");
    }

    #[test]
    fn reset_below_root_drops_subtree() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.commit().unwrap();
        scene.descend(false).unwrap();
        scene.commit().unwrap();
        scene.ascend().unwrap();
        assert_eq!(scene.root().unwrap().size(), 3);

        scene.reset().unwrap();
        assert_eq!(scene.root().unwrap().size(), 1);
        assert_eq!(scene.text_path().to_string(), "1xxxxxx");
        assert!(!scene.is_current_fixed());
    }

    #[test]
    fn reset_at_root_drops_tree() {
        let mut scene = tree_scene();
        scene.place_to_point(R2::new(0.1, 0.1)).unwrap();
        scene.descend(true).unwrap();
        scene.commit().unwrap();
        scene.ascend().unwrap();
        scene.reset().unwrap();
        let root = scene.root().unwrap();
        assert_eq!(root.size(), 1);
        assert!(!root.fixed);
        assert_eq!(root.c, R2::new(0., 0.));
        assert_eq!(center(&scene, 1), R2::new(0., 0.));
    }

    #[test]
    fn mode_transitions() {
        let mut scene = tree_scene();
        scene.descend(true).unwrap();
        scene.commit().unwrap();

        scene.set_mode(Mode::Test).unwrap();
        assert_eq!(scene.current_index(), Some(1));
        assert!(scene.registry().iter().all(|c| !c.enabled));
        assert!(scene.registry().iter().all(|c| c.visible == c.is_universe()));

        scene.replay_path("1").unwrap();
        scene.set_mode(Mode::Tree).unwrap();
        assert_eq!(scene.text_path().to_string(), "1xxxxxx");
        assert!(scene.registry().get(2).unwrap().enabled);

        scene.set_mode(Mode::Free).unwrap();
        assert!(scene.current_index().is_none());
        assert!(scene.registry().iter().all(|c| c.visible && c.enabled));
        assert_eq!(scene.root().unwrap().size(), 2);

        scene.set_mode(Mode::Tree).unwrap();
        assert_eq!(scene.current_index(), Some(1));
    }

    #[test]
    fn knot_placement() {
        let mut scene = tree_scene();
        assert_eq!(scene.place_to_chord(false), Err(SceneError::MissingKnots { needed: 1, found: 0 }));
        scene.place_to_point(R2::new(0.5, 0.)).unwrap();
        assert_eq!(scene.knots().candidates().len(), 2);

        let k1 = scene.knots().candidates()[0];
        assert_eq!(scene.press(k1), Ok(None));
        assert_eq!(scene.knots().first(), Some(k1));
        scene.place_to_chord(false).unwrap();
        assert_eq!(center(&scene, 1), k1);

        let k2 = scene.knots().candidates()[0];
        scene.press(k2).unwrap();
        assert_eq!(scene.knots().pair(), Some((k1, k2)));
        scene.place_to_chord(false).unwrap();
        let c = center(&scene, 1);
        assert_relative_eq!(c.distance(&k1), 0.9, epsilon = 1e-9);
        assert_relative_eq!(c.distance(&k2), 0.9, epsilon = 1e-9);

        scene.place_to_local(R2::new(0., 0.), false).unwrap();
        assert_relative_eq!(center(&scene, 1), k1.midpoint(&k2), epsilon = 1e-12);

        // Descending clears the selection.
        scene.descend(true).unwrap();
        assert_eq!(scene.knots().selected_count(), 0);
        assert_eq!(
            scene.place_to_local(R2::new(0., 0.), false),
            Err(SceneError::MissingKnots { needed: 2, found: 0 })
        );
    }

    #[test]
    fn grab_and_drag() {
        let mut scene = Scene::default();
        scene.set_view(ViewTransform::fit(800., 800.));
        scene.press(R2::new(0.2, 0.)).unwrap();
        assert_eq!(scene.grabbed(), Some(8));
        assert!(scene.registry().iter().all(|c| c.opaque == (c.index == 8)));
        scene.drag(R2::new(0.3, 0.1));
        assert_relative_eq!(center(&scene, 8), R2::new(0.1, 0.1), epsilon = 1e-12);
        scene.release();
        assert_eq!(scene.grabbed(), None);
        assert!(scene.registry().iter().all(|c| c.opaque));
        assert!(!scene.knots().candidates().is_empty());

        // Missing everything clears the selection.
        scene.press(R2::new(5., 5.)).unwrap();
        assert_eq!(scene.grabbed(), None);
        assert_eq!(scene.knots().selected_count(), 0);
    }

    #[test]
    fn drag_pins_to_single_knot() {
        let mut scene = tree_scene();
        scene.place_to_point(R2::new(0.5, 0.)).unwrap();
        let knot = scene.knots().candidates()[0];
        scene.press(knot).unwrap();
        // Grab circle 1 on the far side of its outline.
        let grab_at = R2::new(-0.4, 0.);
        scene.press(grab_at).unwrap();
        assert_eq!(scene.grabbed(), Some(1));
        scene.drag(R2::new(-0.3, 0.05));
        let c = center(&scene, 1);
        assert_relative_eq!(c.distance(&knot), 0.9, epsilon = 1e-9);
        assert_eq!(scene.root().unwrap().c, c);
    }

    #[test]
    fn filled_area_follows_outside_answers() {
        let mut scene = tree_scene();
        scene.set_filled_area(true);
        scene.descend(false).unwrap();
        let first = scene.registry().get(1).unwrap();
        assert!(!first.opaque && first.filled);
        scene.set_filled_area(false);
        assert!(!scene.registry().get(1).unwrap().filled);
        scene.invert().unwrap();
        let first = scene.registry().get(1).unwrap();
        assert!(first.opaque && !first.filled);
    }

    #[test]
    fn zoom_uses_configured_factor() {
        let mut scene = Scene::default();
        scene.set_view(ViewTransform::fit(400., 300.));
        scene.zoom(R2::new(200., 150.), 1.);
        assert_relative_eq!(scene.view().scale, 120. * 1.03125);
        let p = R2::new(0.25, -0.5);
        assert_relative_eq!(scene.to_model(scene.to_view(p)), p, epsilon = 1e-12);
    }
}
