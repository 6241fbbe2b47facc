//! WASM bindings for the nested-circle decision tree engine.
//!
//! A [`Session`] owns one scene and buffers everything the scene reports;
//! the UI shell drains the buffer with [`Session::take_events`] after each call.

use std::fmt::Display;

use log::{error, info, warn};
use nest_core::{
    circle::Circle, view::ViewTransform, Evaluation, EventLog, Mode, Monitor, Scene, SceneConfig, R2,
};
use serde::Serialize;
use tsify::Tsify;
use wasm_bindgen::prelude::*;
use wasm_bindgen_console_logger::DEFAULT_LOGGER;

/// Initializes the logging system for WASM.
///
/// Sets up console logging and panic hooks for better error reporting in the browser.
/// Should be called once at application startup.
#[wasm_bindgen]
pub fn init_logs() {
    match log::set_logger(&DEFAULT_LOGGER) {
        Ok(_) => info!("Initialized console.logger"),
        Err(e) => error!("failed to set console.logger: {}", e),
    };
    console_error_panic_hook::set_once();
}

/// Updates the log level filter.
///
/// # Arguments
/// * `level` - Log level string: "error", "warn", "info", "debug", or "trace".
///   Defaults to "info" if empty or null.
#[wasm_bindgen]
pub fn update_log_level(level: JsValue) {
    let level: Option<String> = serde_wasm_bindgen::from_value(level).ok().flatten();
    let level = nest_core::parse_log_level(level.as_deref());
    log::set_max_level(level);
}

/// Knots as drawn: the selected ones (in selection order) and the candidates.
#[derive(Debug, Clone, Serialize, Tsify)]
pub struct KnotsView {
    pub selected: Vec<R2<f64>>,
    pub candidates: Vec<R2<f64>>,
}

/// One scene plus its buffered monitor events.
///
/// Pointer coordinates are in view space; everything else is in model space.
/// Operations return `false` (or `null`) on failure, after reporting the
/// reason as a monitor error.
#[wasm_bindgen]
pub struct Session {
    scene: Scene<EventLog>,
}

#[wasm_bindgen]
impl Session {
    /// Creates a session; `config` is a partial [`SceneConfig`], or null for the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Session {
        Session { scene: Scene::with_monitor(parse_config(config), EventLog::new()) }
    }

    /// Recreates the circles from `config` (null for the defaults), dropping the tree.
    pub fn init(&mut self, config: JsValue) {
        self.scene.init(parse_config(config));
    }

    /// Removes every circle and the tree.
    pub fn clear(&mut self) {
        self.scene.clear();
    }

    /// Fits the view to a `width` x `height` canvas.
    pub fn fit(&mut self, width: f64, height: f64) {
        self.scene.set_view(ViewTransform::fit(width, height));
    }

    pub fn mode(&self) -> JsValue {
        to_js(&self.scene.mode())
    }

    /// Switches to "Free", "Tree" or "Test".
    pub fn set_mode(&mut self, mode: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<Mode>(mode) {
            Ok(mode) => {
                let result = self.scene.set_mode(mode);
                self.check(result).is_some()
            }
            Err(e) => {
                self.fail(&format!("invalid mode: {}", e));
                false
            }
        }
    }

    /// Descends along `answer` (inside: true), entering tree mode first.
    pub fn answer(&mut self, answer: bool) -> bool {
        self.tree_mode() && {
            let result = self.scene.descend(answer);
            self.check(result).is_some()
        }
    }

    pub fn back(&mut self) -> bool {
        self.tree_mode() && {
            let result = self.scene.ascend();
            self.check(result).is_some()
        }
    }

    pub fn invert(&mut self) -> bool {
        self.tree_mode() && {
            let result = self.scene.invert();
            self.check(result).is_some()
        }
    }

    pub fn replay(&mut self, path: &str) -> bool {
        let result = self.scene.replay_path(path);
        self.check(result).is_some()
    }

    pub fn save_path(&mut self) -> bool {
        let result = self.scene.commit();
        self.check(result).is_some()
    }

    pub fn reset(&mut self) -> bool {
        let result = self.scene.reset();
        self.check(result).is_some()
    }

    /// Open paths of the committed tree.
    pub fn open_paths(&self) -> JsValue {
        to_js(&self.scene.open_paths())
    }

    /// Evaluates a model-space point; returns the [`Evaluation`] or null.
    pub fn test(&mut self, x: f64, y: f64) -> JsValue {
        match self.scene.evaluate(R2::new(x, y)) {
            Ok(eval) => to_js(&eval),
            Err(e) => {
                // Bad solutions are already reported by the scene.
                warn!("test ({}, {}): {}", x, y, e);
                JsValue::NULL
            }
        }
    }

    pub fn place_point(&mut self, x: f64, y: f64) -> bool {
        let result = self.scene.place_to_point(R2::new(x, y));
        self.placed(result)
    }

    pub fn place_local(&mut self, x: f64, y: f64, invert: bool) -> bool {
        let result = self.scene.place_to_local(R2::new(x, y), invert);
        self.placed(result)
    }

    pub fn place_chord(&mut self, invert: bool) -> bool {
        let result = self.scene.place_to_chord(invert);
        self.placed(result)
    }

    /// Pointer press at view coordinates; returns an [`Evaluation`] in test mode, else null.
    pub fn press(&mut self, x: f64, y: f64) -> JsValue {
        let p = self.scene.to_model(R2::new(x, y));
        match self.scene.press(p) {
            Ok(Some(eval)) => to_js::<Evaluation>(&eval),
            Ok(None) => JsValue::NULL,
            Err(e) => {
                warn!("press {}: {}", p, e);
                JsValue::NULL
            }
        }
    }

    pub fn drag(&mut self, x: f64, y: f64) {
        let p = self.scene.to_model(R2::new(x, y));
        self.scene.drag(p);
    }

    pub fn release(&mut self) {
        self.scene.release();
    }

    /// Wheel zoom about view coordinates; positive `steps` zoom in.
    pub fn zoom(&mut self, x: f64, y: f64, steps: f64) {
        self.scene.zoom(R2::new(x, y), steps);
    }

    pub fn view(&self) -> JsValue {
        to_js(self.scene.view())
    }

    pub fn set_filled_area(&mut self, filled_area: bool) {
        self.scene.set_filled_area(filled_area);
    }

    pub fn load(&mut self, json: &str) -> bool {
        let result = self.scene.load(json);
        self.check(result).is_some()
    }

    pub fn save(&mut self) -> Option<String> {
        let result = self.scene.save();
        self.check(result)
    }

    pub fn circles(&self) -> JsValue {
        let circles: Vec<Circle> = self.scene.registry().iter().cloned().collect();
        to_js(&circles)
    }

    pub fn knots(&self) -> JsValue {
        let knots = self.scene.knots();
        let view = KnotsView {
            selected: knots.first().into_iter().chain(knots.second()).collect(),
            candidates: knots.candidates().to_vec(),
        };
        to_js(&view)
    }

    pub fn text_path(&self) -> String {
        self.scene.text_path().to_string()
    }

    /// Drains the buffered monitor events.
    pub fn take_events(&mut self) -> JsValue {
        to_js(&self.scene.monitor_mut().take())
    }
}

impl Session {
    fn tree_mode(&mut self) -> bool {
        if self.scene.mode() == Mode::Tree {
            return true;
        }
        let result = self.scene.set_mode(Mode::Tree);
        self.check(result).is_some()
    }

    fn check<T, E: Display>(&mut self, result: Result<T, E>) -> Option<T> {
        result.map_err(|e| self.fail(&e.to_string())).ok()
    }

    fn placed<E: Display>(&mut self, result: Result<(), E>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("placement: {}", e);
                self.fail("Operation failed!");
                false
            }
        }
    }

    fn fail(&mut self, message: &str) {
        web_sys::console::error_1(&JsValue::from_str(message));
        self.scene.monitor_mut().report_error(message);
    }
}

fn parse_config(config: JsValue) -> SceneConfig {
    if config.is_null() || config.is_undefined() {
        return SceneConfig::default();
    }
    serde_wasm_bindgen::from_value(config).unwrap_or_else(|e| {
        error!("invalid scene config, using defaults: {}", e);
        SceneConfig::default()
    })
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        error!("failed to serialize: {}", e);
        JsValue::NULL
    })
}
