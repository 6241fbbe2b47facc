use serde::{Deserialize, Serialize};
use tsify::Tsify;

/// Scene setup: the circles created by [`crate::Scene::init`] and the pointer tolerances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    /// Radius of the universe circle (index 0).
    pub universe_radius: f64,
    /// Working circle radii, outermost first.
    pub radii: Vec<f64>,
    /// Knot pick radius, in view units.
    pub knot_pick_px: f64,
    /// Circle outline pick distance, in view units.
    pub ring_pick_px: f64,
    /// Scale factor applied per zoom step.
    pub zoom_factor: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            universe_radius: Self::DEFAULT_UNIVERSE_RADIUS,
            radii: Self::DEFAULT_RADII.to_vec(),
            knot_pick_px: 5.,
            ring_pick_px: 10.,
            zoom_factor: 1.03125,
        }
    }
}

impl SceneConfig {
    pub const DEFAULT_UNIVERSE_RADIUS: f64 = 1.;
    pub const DEFAULT_RADII: [f64; 8] = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2];

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_radii(radii: &[f64]) -> Self {
        Self { radii: radii.to_vec(), ..Self::default() }
    }
}
