//! Tap and multi-tap.
//!
//! Taps are counted at release. Consecutive taps close in time and position
//! add to a running count; the gesture resolves each time the count reaches
//! a multiple of `taps`. A recognizer with require-failure peers waits one
//! more `interval` before resolving so the peers can settle first.

use super::{Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::event::InputPhase;
use crate::geometry::Point;
use crate::input::InputFrame;
use crate::timer::TimerAction;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Tap options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count
    pub pointers: usize,
    /// Taps per gesture
    pub taps: u32,
    /// Maximum gap in milliseconds between consecutive taps
    pub interval: u64,
    /// Maximum contact time in milliseconds for one tap
    pub time: u64,
    /// Maximum travel in pixels during one tap
    pub threshold: f32,
    /// Maximum distance in pixels between consecutive tap centers
    pub pos_threshold: f32,
    /// Static enable flag
    pub enable: bool,
}

impl Default for TapOptions {
    fn default() -> Self {
        Self {
            event: "tap".to_string(),
            pointers: 1,
            taps: 1,
            interval: 300,
            time: 250,
            threshold: 2.0,
            pos_threshold: 10.0,
            enable: true,
        }
    }
}

/// Tap pattern state.
#[derive(Debug, Clone, Default)]
pub struct Tap {
    /// Options, mutable between frames
    pub options: TapOptions,
    count: u32,
    prev_time: Option<u64>,
    prev_center: Option<Point>,
    last_input: Option<InputFrame>,
}

impl Tap {
    /// Create a tap pattern.
    #[must_use]
    pub const fn new(options: TapOptions) -> Self {
        Self {
            options,
            count: 0,
            prev_time: None,
            prev_center: None,
            last_input: None,
        }
    }

    /// Running tap count.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Fail now and again after `interval`, so a dangling partial sequence
    /// does not hold its peers.
    fn fail_timeout(&self, frame: &InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState {
        cx.timer.arm(
            frame.timestamp.saturating_add(self.options.interval),
            TimerAction::Fail,
        );
        RecognizerState::Failed
    }
}

impl Gesture for Tap {
    fn event(&self) -> &str {
        &self.options.event
    }

    fn enabled(&self) -> bool {
        self.options.enable
    }

    fn touch_action(&self) -> TouchAction {
        TouchAction::MANIPULATION
    }

    fn process(&mut self, frame: &mut InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState {
        let options = &self.options;
        let valid_pointers = frame.pointer_count() == options.pointers;
        let valid_movement = frame.distance < options.threshold;
        let valid_touch_time = frame.delta_time < options.time;

        cx.timer.cancel();

        if frame.phase == InputPhase::Start && self.count == 0 {
            return self.fail_timeout(frame, cx);
        }
        if !(valid_movement && valid_touch_time && valid_pointers) {
            return RecognizerState::Failed;
        }
        if frame.phase != InputPhase::End {
            return self.fail_timeout(frame, cx);
        }

        let valid_interval = self
            .prev_time
            .map_or(true, |t| frame.timestamp.saturating_sub(t) < options.interval);
        let valid_multi_tap = self
            .prev_center
            .map_or(true, |c| c.distance(&frame.center) < options.pos_threshold);
        self.prev_time = Some(frame.timestamp);
        self.prev_center = Some(frame.center);
        self.count = if valid_interval && valid_multi_tap {
            self.count.saturating_add(1)
        } else {
            1
        };
        self.last_input = Some(frame.clone());

        if self.count % self.options.taps.max(1) != 0 {
            return RecognizerState::Failed;
        }
        if !cx.has_require_failures {
            return RecognizerState::RECOGNIZED;
        }
        cx.timer.arm(
            frame.timestamp.saturating_add(self.options.interval),
            TimerAction::Recognize,
        );
        RecognizerState::Began
    }

    fn emit(&mut self, state: RecognizerState, _trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        if state != RecognizerState::RECOGNIZED {
            return;
        }
        if let Some(input) = self.last_input.clone() {
            let mut event = GestureEvent::new(self.options.event.clone(), input);
            event.tap_count = Some(self.count);
            out.push(event);
        }
    }
}
