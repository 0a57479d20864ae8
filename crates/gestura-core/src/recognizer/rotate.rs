//! Rotate: two pointers turning around their center.

use super::attr;
use super::{emit_lifecycle, Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::input::InputFrame;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Rotate options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count, `0` for any
    pub pointers: usize,
    /// Minimum rotation in degrees before the gesture begins
    pub threshold: f32,
    /// Static enable flag
    pub enable: bool,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            event: "rotate".to_string(),
            pointers: 2,
            threshold: 0.0,
            enable: true,
        }
    }
}

/// Rotate pattern.
#[derive(Debug, Clone, Default)]
pub struct Rotate {
    /// Options, mutable between frames
    pub options: RotateOptions,
}

impl Rotate {
    /// Create a rotate pattern.
    #[must_use]
    pub const fn new(options: RotateOptions) -> Self {
        Self { options }
    }
}

impl Gesture for Rotate {
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
            && (frame.rotation.abs() > self.options.threshold || cx.state.is_active());
        attr::transition(cx.state, frame.phase, passes)
    }

    fn emit(&mut self, state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        if let Trigger::Frame(frame) = trigger {
            emit_lifecycle(&self.options.event, state, frame, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputPhase;
    use crate::recognizer::test_support::FrameFeed;
    use crate::recognizer::Recognizer;

    #[test]
    fn test_rotation_past_threshold() {
        let mut feed = FrameFeed::default();
        let mut rotate = Recognizer::new(RotateOptions {
            threshold: 15.0,
            ..RotateOptions::default()
        });
        rotate.recognize(&feed.frame(InputPhase::Start, &[(100.0, 0.0), (0.0, 0.0)], 0), &[]);

        // about 5.7 degrees: not enough
        rotate.recognize(&feed.frame(InputPhase::Move, &[(100.0, 10.0), (0.0, 0.0)], 30), &[]);
        assert_eq!(rotate.state(), RecognizerState::Failed);

        // 45 degrees
        let out = rotate.recognize(&feed.frame(InputPhase::Move, &[(100.0, 100.0), (0.0, 0.0)], 60), &[]);
        assert_eq!(rotate.state(), RecognizerState::Began);
        assert!((out[0].frame.rotation - 45.0).abs() < 1e-3);

        // active: keeps going even when rotation drops back
        rotate.recognize(&feed.frame(InputPhase::Move, &[(100.0, 0.0), (0.0, 0.0)], 90), &[]);
        assert_eq!(rotate.state(), RecognizerState::Changed);

        let out = rotate.recognize(&feed.frame(InputPhase::End, &[(100.0, 0.0), (0.0, 0.0)], 120), &[]);
        assert_eq!(rotate.state(), RecognizerState::Ended);
        assert_eq!(out.last().unwrap().event_type, "rotateend");
    }
}
