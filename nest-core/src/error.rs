use crate::scene::Mode;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Operation requires {expected} mode, scene is in {actual} mode")]
    WrongMode { expected: Mode, actual: Mode },

    #[error("No current tree node")]
    NoCurrentNode,

    #[error("Already at the root node")]
    AtRoot,

    #[error("Depth limit {0} reached")]
    DepthLimit(usize),

    #[error("Missing circle {0}")]
    MissingCircle(usize),

    #[error("Construction needs {needed} selected knot(s), found {found}")]
    MissingKnots { needed: usize, found: usize },

    #[error("Construction has no solution")]
    NoSolution,

    #[error("Point {0} lies outside the universe circle")]
    OutsideDomain(String),

    #[error("Bad solution! (path {path})")]
    BadSolution { path: String },

    #[error("No tree has been built")]
    NoTree,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document lists no working circle radii")]
    NoRadii,

    #[error("Radius #{index} must be positive, found {radius}")]
    InvalidRadius { index: usize, radius: f64 },

    #[error("Tree reaches depth {depth}, only {max} circle levels available")]
    TreeTooDeep { depth: usize, max: usize },

    #[error("No tree has been built")]
    NoTree,

    #[error(transparent)]
    Scene(#[from] SceneError),
}
