//! Pinch: two pointers moving apart or together.

use super::attr;
use super::{emit_lifecycle, Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::input::InputFrame;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Pinch options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count, `0` for any
    pub pointers: usize,
    /// Minimum `|scale - 1|` before the pinch begins
    pub threshold: f32,
    /// Static enable flag
    pub enable: bool,
}

impl Default for PinchOptions {
    fn default() -> Self {
        Self {
            event: "pinch".to_string(),
            pointers: 2,
            threshold: 0.0,
            enable: true,
        }
    }
}

/// Pinch pattern.
#[derive(Debug, Clone, Default)]
pub struct Pinch {
    /// Options, mutable between frames
    pub options: PinchOptions,
}

impl Pinch {
    /// Create a pinch pattern.
    #[must_use]
    pub const fn new(options: PinchOptions) -> Self {
        Self { options }
    }
}

impl Gesture for Pinch {
    fn event(&self) -> &str {
        &self.options.event
    }

    fn enabled(&self) -> bool {
        self.options.enable
    }

    fn touch_action(&self) -> TouchAction {
        TouchAction::NONE
    }

    fn process(&mut self, frame: &mut InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState {
        let passes = attr::pointers_match(self.options.pointers, frame)
            && ((frame.scale - 1.0).abs() > self.options.threshold || cx.state.is_active());
        attr::transition(cx.state, frame.phase, passes)
    }

    #[allow(clippy::float_cmp)]
    fn emit(&mut self, state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        let Trigger::Frame(frame) = trigger else {
            return;
        };
        emit_lifecycle(&self.options.event, state, frame, out);
        if frame.scale != 1.0 {
            let way = if frame.scale < 1.0 { "in" } else { "out" };
            out.push(GestureEvent::new(
                format!("{}{way}", self.options.event),
                frame.clone(),
            ));
        }
    }
}
