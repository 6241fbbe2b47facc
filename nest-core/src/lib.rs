#[cfg_attr(not(test), allow(unused_imports))]
#[macro_use]
extern crate approx;

pub mod geometry;

pub use geometry::circle;
pub use geometry::intersect;
pub use geometry::place;
pub use geometry::r2;
pub use geometry::view;

pub mod config;
pub mod document;
pub mod error;
pub mod evaluate;
pub mod knots;
pub mod monitor;
pub mod registry;
pub mod scene;
pub mod tree;
pub mod walk;

pub use config::SceneConfig;
pub use document::{Document, NodeDocument};
pub use error::{DocumentError, SceneError};
pub use evaluate::Evaluation;
pub use monitor::{EventLog, Monitor, MonitorEvent};
pub use r2::R2;
pub use scene::{Mode, Scene};
pub use tree::TreeNode;
pub use walk::{TextPath, Walk};

/// Parse a log level string into LevelFilter; unknown names fall back to Info.
pub fn parse_log_level(level: Option<&str>) -> log::LevelFilter {
    match level {
        Some("error") => log::LevelFilter::Error,
        Some("warn") => log::LevelFilter::Warn,
        Some("info") | Some("") | None => log::LevelFilter::Info,
        Some("debug") => log::LevelFilter::Debug,
        Some("trace") => log::LevelFilter::Trace,
        Some("off") => log::LevelFilter::Off,
        Some(level) => {
            log::warn!("invalid log level: {}, using info", level);
            log::LevelFilter::Info
        }
    }
}
