//! Recorded pointer traces.
//!
//! A trace is a time-ordered list of single-pointer events. Replaying it
//! feeds each event through a [`PointerTracker`] into a manager, then
//! advances time past the last event so pending press and tap timers
//! resolve.

use crate::error::ConfigError;
use crate::format::Format;
use gestura_core::{
    GestureEvent, Manager, NoSource, Point, PointerAction, PointerEvent, PointerSample,
    PointerTracker, PointerType,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace};

/// Suffixes a recognizer's base name can carry.
const EVENT_SUFFIXES: [&str; 10] = [
    "start", "move", "end", "cancel", "left", "right", "up", "down", "in", "out",
];

/// One recorded pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Time in milliseconds
    pub at: u64,
    /// Pointer identifier
    #[serde(default)]
    pub pointer: u32,
    /// What happened
    pub action: PointerAction,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Device type
    #[serde(default)]
    pub pointer_type: PointerType,
    /// Pressed button
    #[serde(default)]
    pub button: u8,
}

impl TraceEvent {
    fn to_pointer_event(self) -> PointerEvent {
        PointerEvent::new(
            self.action,
            PointerSample::new(self.pointer, self.x, self.y),
            self.at,
        )
        .with_pointer_type(self.pointer_type)
        .with_button(self.button)
    }
}

/// A gesture observed during replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedGesture {
    /// Event name
    pub event: String,
    /// Frame time in milliseconds
    pub at: u64,
    /// Pointer center
    pub center: Point,
    /// Total displacement
    pub delta_x: f32,
    /// Total displacement
    pub delta_y: f32,
    /// Two-pointer scale
    pub scale: f32,
    /// Two-pointer rotation in degrees
    pub rotation: f32,
    /// Dominant velocity in px/ms
    pub velocity: f32,
    /// Tap count, for taps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_count: Option<u32>,
}

impl From<&GestureEvent> for RecordedGesture {
    fn from(event: &GestureEvent) -> Self {
        let frame = &event.frame;
        Self {
            event: event.event_type.clone(),
            at: frame.timestamp,
            center: frame.center,
            delta_x: frame.delta_x,
            delta_y: frame.delta_y,
            scale: frame.scale,
            rotation: frame.rotation,
            velocity: frame.velocity,
            tap_count: event.tap_count,
        }
    }
}

/// A replayable pointer trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    /// Events in time order
    pub events: Vec<TraceEvent>,
    /// Milliseconds to advance past the last event
    pub settle: u64,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            settle: 1000,
        }
    }
}

impl Trace {
    /// Parse a trace in the given format.
    pub fn parse(text: &str, format: Format) -> Result<Self, ConfigError> {
        format.parse(text)
    }

    /// Parse a YAML trace.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, Format::Yaml)
    }

    /// Load a trace file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = Format::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let trace = Self::parse(&text, format)?;
        debug!(path = %path.display(), events = trace.events.len(), "trace loaded");
        Ok(trace)
    }

    /// Check that timestamps never go backwards.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.events
            .windows(2)
            .enumerate()
            .find(|(_, pair)| pair[1].at < pair[0].at)
            .map_or(Ok(()), |(i, pair)| {
                Err(ConfigError::OutOfOrder {
                    index: i + 1,
                    at: pair[1].at,
                    previous: pair[0].at,
                })
            })
    }

    /// Feed the trace into `manager` and collect every gesture it emits.
    ///
    /// Events about pointers that are not down are skipped. Handlers already
    /// registered on the manager still run.
    pub fn replay(&self, manager: &mut Manager) -> Vec<RecordedGesture> {
        let names = gesture_names(manager);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let handler = manager.on(&names, move |event, _| {
            sink.borrow_mut().push(RecordedGesture::from(event));
        });

        let mut tracker = PointerTracker::new();
        let mut last = 0;
        for event in &self.events {
            last = last.max(event.at);
            match tracker.feed(&event.to_pointer_event()) {
                Some(raw) => manager.handle(&raw, &mut NoSource),
                None => trace!(pointer = event.pointer, action = ?event.action, "skipped"),
            }
        }
        manager.advance(last.saturating_add(self.settle));
        manager.off(&names, Some(handler));

        let recorded = log.take();
        debug!(events = self.events.len(), gestures = recorded.len(), "trace replayed");
        recorded
    }
}

/// Every event name the manager's recognizers can emit, space separated.
fn gesture_names(manager: &Manager) -> String {
    let mut names = Vec::new();
    for recognizer in manager.recognizers() {
        let base = recognizer.event();
        names.push(base.to_string());
        names.extend(EVENT_SUFFIXES.iter().map(|suffix| format!("{base}{suffix}")));
    }
    names.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAP_TRACE: &str = r"
events:
  - { at: 0, action: down, x: 10, y: 10 }
  - { at: 60, action: up, x: 10, y: 10 }
";

    #[test]
    fn test_parse_trace_defaults() {
        let trace = Trace::from_yaml(TAP_TRACE).unwrap();
        assert_eq!(trace.events.len(), 2);
        assert_eq!(trace.settle, 1000);
        assert_eq!(trace.events[0].pointer, 0);
        assert_eq!(trace.events[0].pointer_type, PointerType::Touch);
        assert_eq!(trace.events[1].action, PointerAction::Up);
    }

    #[test]
    fn test_replay_tap() {
        let trace = Trace::from_yaml(TAP_TRACE).unwrap();
        let mut manager = Manager::with_default_preset(Default::default());
        let gestures = trace.replay(&mut manager);

        assert_eq!(gestures.len(), 1);
        assert_eq!(gestures[0].event, "tap");
        assert_eq!(gestures[0].tap_count, Some(1));
        assert_eq!(gestures[0].center, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_replay_is_repeatable() {
        let trace = Trace::from_yaml(TAP_TRACE).unwrap();
        let mut manager = Manager::with_default_preset(Default::default());
        assert_eq!(trace.replay(&mut manager).len(), 1);

        let later = Trace {
            events: trace
                .events
                .iter()
                .map(|e| TraceEvent { at: e.at + 10_000, ..*e })
                .collect(),
            ..trace
        };
        let gestures = later.replay(&mut manager);
        assert_eq!(gestures.len(), 1);
        assert_eq!(gestures[0].at, 10_060);
    }

    #[test]
    fn test_validate_rejects_time_travel() {
        let trace = Trace::from_yaml(TAP_TRACE).unwrap();
        assert!(trace.validate().is_ok());

        let base = trace.events[0];
        let shuffled = Trace {
            events: [0, 20, 10].map(|at| TraceEvent { at, ..base }).to_vec(),
            ..Trace::default()
        };
        assert!(matches!(
            shuffled.validate(),
            Err(ConfigError::OutOfOrder { index: 2, at: 10, previous: 20 })
        ));
    }

    #[test]
    fn test_gesture_names_cover_variants() {
        let manager = Manager::with_default_preset(Default::default());
        let names = gesture_names(&manager);
        for expected in ["panleft", "swipeup", "pinchout", "pressup", "doubletap", "rotatemove"] {
            assert!(names.split(' ').any(|n| n == expected), "missing {expected}");
        }
    }
}
