//! JSON persistence of the working circle radii and the committed tree.
//!
//! ```json
//! {"radius":[0.9,0.8],"search":{"center":[0,0],"branch":[{},{"center":[0.1,0],"branch":[{},{}]}]}}
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    error::DocumentError,
    monitor::Monitor,
    r2::R2,
    scene::{Mode, Scene},
    tree::TreeNode,
};

/// Values of the wrong type read as 0 or empty instead of failing the whole
/// document; only unparseable JSON is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Working circle radii in index order, starting at circle 1.
    #[serde(default, deserialize_with = "lenient::numbers")]
    pub radius: Vec<f64>,
    /// Root of the tree, bound to circle 1.
    #[serde(default, deserialize_with = "lenient::node")]
    pub search: NodeDocument,
}

/// One tree node; `{}` marks an empty branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::center")]
    pub center: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::branch")]
    pub branch: Option<Vec<NodeDocument>>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::NodeDocument;

    fn to_numbers(value: Value) -> Vec<f64> {
        match value {
            Value::Array(values) => values.iter().map(|v| v.as_f64().unwrap_or(0.)).collect(),
            _ => vec![],
        }
    }

    fn to_node(value: Value) -> NodeDocument {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn numbers<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        Ok(to_numbers(Value::deserialize(d)?))
    }

    pub fn node<'de, D: Deserializer<'de>>(d: D) -> Result<NodeDocument, D::Error> {
        Ok(to_node(Value::deserialize(d)?))
    }

    pub fn center<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<f64>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            value => Some(to_numbers(value)),
        })
    }

    pub fn branch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<NodeDocument>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::Array(values) => Some(values.into_iter().map(to_node).collect()),
            _ => Some(vec![]),
        })
    }
}

impl NodeDocument {
    pub fn is_empty(&self) -> bool {
        self.center.is_none() && self.branch.is_none()
    }

    /// Center, with missing coordinates read as 0.
    pub fn point(&self) -> R2<f64> {
        let coord = |i: usize| self.center.as_ref().and_then(|c| c.get(i)).copied().unwrap_or(0.);
        R2::new(coord(0), coord(1))
    }
}

impl Document {
    /// Checks the radii and rebuilds the tree, without touching any scene.
    fn to_tree(&self) -> Result<Option<TreeNode>, DocumentError> {
        if self.radius.is_empty() {
            return Err(DocumentError::NoRadii);
        }
        if let Some((index, radius)) = self.radius.iter().enumerate().find(|(_, r)| !(**r > 0.)) {
            return Err(DocumentError::InvalidRadius { index, radius: *radius });
        }
        if self.search.is_empty() {
            return Ok(None);
        }
        TreeNode::from_document(&self.search, 1, self.radius.len()).map(Some)
    }
}

impl<M: Monitor> Scene<M> {
    /// Replaces the circles and the tree with those in `json`, then restarts
    /// the walk at the root. Nothing changes if the document is rejected.
    pub fn load(&mut self, json: &str) -> Result<(), DocumentError> {
        let doc: Document = serde_json::from_str(json)?;
        self.load_document(&doc)
    }

    pub fn load_document(&mut self, doc: &Document) -> Result<(), DocumentError> {
        let root = doc.to_tree()?;
        let nodes = root.as_ref().map_or(0, TreeNode::size);
        self.clear();
        let universe_radius = self.config().universe_radius;
        let registry = self.registry_mut();
        registry.create_circle(R2::default(), universe_radius);
        for r in &doc.radius {
            registry.create_circle(R2::default(), *r);
        }
        self.replace_tree(root);
        if self.mode() == Mode::Free {
            self.set_mode_quiet(Mode::Tree);
        }
        self.start()?;
        info!("loaded {} circles and {} tree node(s)", doc.radius.len() + 1, nodes);
        Ok(())
    }

    /// The working radii and the committed tree, if there is one.
    pub fn to_document(&self) -> Option<Document> {
        self.root().map(|root| Document {
            radius: self.registry().working_radii(),
            search: root.to_document(),
        })
    }

    pub fn save(&self) -> Result<String, DocumentError> {
        let doc = self.to_document().ok_or(DocumentError::NoTree)?;
        let json = serde_json::to_string(&doc)?;
        info!("saved {} radii, {} bytes", doc.radius.len(), json.len());
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use test_log::test;

    fn built() -> Scene {
        let mut scene = Scene::new(SceneConfig::with_radii(&[0.9, 0.7, 0.5, 0.3]));
        scene.set_mode(Mode::Tree).unwrap();
        scene.place_to_point(R2::new(0.05, -0.05)).unwrap();
        scene.descend(false).unwrap();
        scene.place_to_point(R2::new(-0.1, 0.2)).unwrap();
        scene.descend(true).unwrap();
        scene.place_to_point(R2::new(-0.125, 0.25)).unwrap();
        scene.commit().unwrap();
        scene
    }

    #[test]
    fn round_trip() {
        let scene = built();
        let json = scene.save().unwrap();
        let mut loaded = Scene::default();
        loaded.load(&json).unwrap();

        assert_eq!(loaded.registry().working_radii(), vec![0.9, 0.7, 0.5, 0.3]);
        assert_eq!(loaded.registry().get(0).map(|c| c.r), Some(1.));
        assert_eq!(loaded.mode(), Mode::Tree);
        assert_eq!(loaded.current_index(), Some(1));
        assert_eq!(loaded.open_paths(), scene.open_paths());

        let (a, b) = (scene.root().unwrap(), loaded.root().unwrap());
        assert_eq!(b.size(), a.size());
        let paths: [&[bool]; 3] = [&[], &[false], &[false, true]];
        for path in paths {
            let (x, y) = (a.follow(path).unwrap(), b.follow(path).unwrap());
            assert_eq!(x.index, y.index);
            assert!(y.fixed);
            assert_relative_eq!(x.c, y.c, epsilon = 1e-9);
        }
        assert_eq!(loaded.save().unwrap(), json);
    }

    #[test]
    fn empty_branches_serialize_as_empty_objects() {
        let json = built().save().unwrap();
        assert!(json.starts_with(r#"{"radius":[0.9,0.7,0.5,0.3],"search":{"center":[0.05,-0.05],"branch":[{"center""#));
        assert!(json.contains(r#""branch":[{},{}]"#));
    }

    #[test]
    fn missing_fields_default() {
        let mut scene = Scene::default();
        scene.load(r#"{"radius":[0.5,0.25],"search":{"branch":[{"center":[0.1]},{}]}}"#).unwrap();
        assert_eq!(scene.registry().len(), 3);
        let root = scene.root().unwrap();
        assert_eq!(root.c, R2::new(0., 0.));
        assert_eq!(root.child(false).unwrap().c, R2::new(0.1, 0.));

        scene.load(r#"{"radius":[0.5]}"#).unwrap();
        assert_eq!(scene.root().map(|r| r.size()), Some(1));
        assert_eq!(scene.text_path().to_string(), "");
    }

    #[test]
    fn wrong_types_read_as_zero_or_empty() {
        let mut scene = Scene::default();
        scene
            .load(r#"{"radius":[0.5,0.25],"search":{"center":[0.1,"0.2"],"branch":[3,{"center":"here","branch":"none"}]}}"#)
            .unwrap();
        let root = scene.root().unwrap();
        assert_eq!(root.c, R2::new(0.1, 0.));
        assert!(root.child(false).is_none());
        let inside = root.child(true).unwrap();
        assert_eq!(inside.c, R2::new(0., 0.));
        assert_eq!(inside.size(), 1);

        // A non-numeric radius reads as 0, which no circle can have.
        assert!(matches!(
            scene.load(r#"{"radius":[0.5,"big"]}"#),
            Err(DocumentError::InvalidRadius { index: 1, .. })
        ));
        assert!(matches!(scene.load(r#"{"radius":"0.5"}"#), Err(DocumentError::NoRadii)));
        assert_eq!(scene.registry().len(), 3);
    }

    #[test]
    fn rejected_documents_leave_scene_alone() {
        let mut scene = built();
        let before = scene.save().unwrap();
        assert!(matches!(scene.load("nope"), Err(DocumentError::Json(_))));
        assert!(matches!(scene.load(r#"{"search":{}}"#), Err(DocumentError::NoRadii)));
        assert!(matches!(
            scene.load(r#"{"radius":[0.5,-1]}"#),
            Err(DocumentError::InvalidRadius { index: 1, .. })
        ));
        // Two radii leave room for a root and one level below it.
        assert!(matches!(
            scene.load(r#"{"radius":[0.5,0.25],"search":{"branch":[{"branch":[{},{"center":[0,0]}]},{}]}}"#),
            Err(DocumentError::TreeTooDeep { depth: 2, max: 1 })
        ));
        assert_eq!(scene.save().unwrap(), before);
        assert_eq!(scene.registry().len(), 5);
    }

    #[test]
    fn save_without_tree() {
        let scene = Scene::default();
        assert!(matches!(scene.save(), Err(DocumentError::NoTree)));
        assert!(scene.to_document().is_none());
    }

    #[test]
    fn load_keeps_test_mode() {
        let json = built().save().unwrap();
        let mut scene = Scene::default();
        scene.set_mode(Mode::Test).unwrap();
        scene.load(&json).unwrap();
        assert_eq!(scene.mode(), Mode::Test);
        assert!(scene.registry().iter().all(|c| !c.enabled));
    }
}
