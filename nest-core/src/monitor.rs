//! Observer boundary: the scene reports pointer positions, the current path
//! and user-facing errors to whatever UI is attached.

use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::r2::R2;

/// Receives fire-and-forget notifications from a [`crate::Scene`].
///
/// Every method defaults to doing nothing, and `()` is the silent monitor.
pub trait Monitor {
    /// Pointer position in model space; `fixed` for clicks, not for moves.
    fn report_position(&mut self, _point: R2<f64>, _fixed: bool) {}

    /// Current text path, and whether the current node is committed.
    fn report_path(&mut self, _path: &str, _fixed: bool) {}

    fn report_error(&mut self, _message: &str) {}
}

impl Monitor for () {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MonitorEvent {
    Position { point: R2<f64>, fixed: bool },
    Path { path: String, fixed: bool },
    Error { message: String },
}

/// Monitor that buffers every notification until drained.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<MonitorEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MonitorEvent] {
        &self.events
    }

    /// Drains the buffered events.
    pub fn take(&mut self) -> Vec<MonitorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recently reported path.
    pub fn last_path(&self) -> Option<(&str, bool)> {
        self.events.iter().rev().find_map(|e| match e {
            MonitorEvent::Path { path, fixed } => Some((path.as_str(), *fixed)),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MonitorEvent::Error { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Monitor for EventLog {
    fn report_position(&mut self, point: R2<f64>, fixed: bool) {
        self.events.push(MonitorEvent::Position { point, fixed });
    }

    fn report_path(&mut self, path: &str, fixed: bool) {
        self.events.push(MonitorEvent::Path { path: path.to_string(), fixed });
    }

    fn report_error(&mut self, message: &str) {
        self.events.push(MonitorEvent::Error { message: message.to_string() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log() {
        let mut log = EventLog::new();
        log.report_path("0x", false);
        log.report_position(R2::new(0.5, 0.5), true);
        log.report_path("01", true);
        log.report_error("Bad solution!");
        assert_eq!(log.last_path(), Some(("01", true)));
        assert_eq!(log.errors(), vec!["Bad solution!"]);
        assert_eq!(log.take().len(), 4);
        assert!(log.events().is_empty());
    }

    #[test]
    fn event_json_shape() {
        let json = serde_json::to_string(&MonitorEvent::Path { path: "1x".into(), fixed: false }).unwrap();
        assert_eq!(json, r#"{"kind":"path","path":"1x","fixed":false}"#);
    }
}
