//! Pan: a drag that starts once the pointers travel past a threshold.

use super::attr;
use super::{emit_lifecycle, Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::input::InputFrame;
use crate::kinematics::Direction;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Pan options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count, `0` for any
    pub pointers: usize,
    /// Minimum travel in pixels before the pan begins
    pub threshold: f32,
    /// Allowed directions
    pub direction: Direction,
    /// Static enable flag
    pub enable: bool,
}

impl Default for PanOptions {
    fn default() -> Self {
        Self {
            event: "pan".to_string(),
            pointers: 1,
            threshold: 10.0,
            direction: Direction::ALL,
            enable: true,
        }
    }
}

/// Pan pattern state.
#[derive(Debug, Clone, Default)]
pub struct Pan {
    /// Options, mutable between frames
    pub options: PanOptions,
    last_x: Option<f32>,
    last_y: Option<f32>,
}

impl Pan {
    /// Create a pan pattern.
    #[must_use]
    pub const fn new(options: PanOptions) -> Self {
        Self {
            options,
            last_x: None,
            last_y: None,
        }
    }

    /// Check travel along the allowed directions, rewriting the frame's
    /// direction to the axis-constrained one when the natural direction is
    /// not allowed.
    fn direction_test(&self, frame: &mut InputFrame) -> bool {
        let allowed = self.options.direction;
        let mut direction = frame.direction;
        let mut distance = frame.distance;
        let mut has_moved = true;

        if !direction.intersects(allowed) {
            (direction, distance) = constrained_direction(allowed, frame.delta_x, frame.delta_y);
            has_moved = if allowed.intersects(Direction::HORIZONTAL) {
                self.last_x != Some(frame.delta_x)
            } else {
                self.last_y != Some(frame.delta_y)
            };
        }

        frame.direction = direction;
        has_moved && distance > self.options.threshold && direction.intersects(allowed)
    }
}

/// Direction and travel along the single axis `allowed` favours.
///
/// A horizontal mask projects onto x, anything else onto y. Zero travel on
/// that axis yields `NONE`.
#[must_use]
pub fn constrained_direction(allowed: Direction, delta_x: f32, delta_y: f32) -> (Direction, f32) {
    let signed = |v: f32, negative: Direction, positive: Direction| {
        if v == 0.0 {
            Direction::NONE
        } else if v < 0.0 {
            negative
        } else {
            positive
        }
    };
    if allowed.intersects(Direction::HORIZONTAL) {
        (signed(delta_x, Direction::LEFT, Direction::RIGHT), delta_x.abs())
    } else {
        (signed(delta_y, Direction::UP, Direction::DOWN), delta_y.abs())
    }
}

/// Touch-action hint shared by the directional gestures.
pub(super) fn directional_touch_action(direction: Direction) -> TouchAction {
    if direction == Direction::ALL {
        return TouchAction::NONE;
    }
    let mut actions = TouchAction::AUTO;
    if direction.intersects(Direction::HORIZONTAL) {
        actions |= TouchAction::PAN_Y;
    }
    if direction.intersects(Direction::VERTICAL) {
        actions |= TouchAction::PAN_X;
    }
    actions
}

impl Gesture for Pan {
    fn event(&self) -> &str {
        &self.options.event
    }

    fn enabled(&self) -> bool {
        self.options.enable
    }

    fn touch_action(&self) -> TouchAction {
        directional_touch_action(self.options.direction)
    }

    fn process(&mut self, frame: &mut InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState {
        let passes = attr::pointers_match(self.options.pointers, frame)
            && (cx.state.is_active() || self.direction_test(frame));
        attr::transition(cx.state, frame.phase, passes)
    }

    fn emit(&mut self, state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        let Trigger::Frame(frame) = trigger else {
            return;
        };
        self.last_x = Some(frame.delta_x);
        self.last_y = Some(frame.delta_y);
        if let Some(suffix) = frame.direction.suffix() {
            out.push(GestureEvent::new(
                format!("{}{suffix}", self.options.event),
                frame.clone(),
            ));
        }
        emit_lifecycle(&self.options.event, state, frame, out);
    }

    fn reset(&mut self) {
        self.last_x = None;
        self.last_y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputPhase;
    use crate::recognizer::test_support::FrameFeed;
    use crate::recognizer::Recognizer;

    fn names(events: &[GestureEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_type.as_str()).collect()
    }

    fn horizontal() -> Recognizer {
        Recognizer::new(PanOptions {
            direction: Direction::HORIZONTAL,
            threshold: 10.0,
            ..PanOptions::default()
        })
    }

    #[test]
    fn test_horizontal_pan_lifecycle() {
        let mut feed = FrameFeed::default();
        let mut pan = horizontal();

        let out = pan.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        assert!(out.is_empty());
        assert_eq!(pan.state(), RecognizerState::Failed);

        let out = pan.recognize(&feed.frame(InputPhase::Move, &[(20.0, 0.0)], 50), &[]);
        assert_eq!(pan.state(), RecognizerState::Began);
        assert_eq!(names(&out), ["panright", "panstart", "pan"]);

        let out = pan.recognize(&feed.frame(InputPhase::End, &[(20.0, 0.0)], 100), &[]);
        assert_eq!(pan.state(), RecognizerState::Ended);
        assert_eq!(names(&out), ["pan", "panend"]);
        assert_eq!(out[0].frame.delta_x, 20.0);
    }

    #[test]
    fn test_below_threshold_fails() {
        let mut feed = FrameFeed::default();
        let mut pan = horizontal();
        pan.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        pan.recognize(&feed.frame(InputPhase::Move, &[(8.0, 0.0)], 50), &[]);
        assert_eq!(pan.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_constrained_axis_rewrites_direction() {
        let mut feed = FrameFeed::default();
        let mut pan = horizontal();
        pan.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        // mostly downward, but 15px of horizontal travel
        let out = pan.recognize(&feed.frame(InputPhase::Move, &[(-15.0, 40.0)], 50), &[]);
        assert_eq!(pan.state(), RecognizerState::Began);
        assert_eq!(names(&out), ["panleft", "panstart", "pan"]);
        assert_eq!(out[0].frame.direction, Direction::LEFT);
    }

    #[test]
    fn test_vertical_pan_ignores_horizontal_drag() {
        let mut feed = FrameFeed::default();
        let mut pan = Recognizer::new(PanOptions {
            direction: Direction::VERTICAL,
            ..PanOptions::default()
        });
        pan.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        pan.recognize(&feed.frame(InputPhase::Move, &[(80.0, 0.0)], 50), &[]);
        assert_eq!(pan.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_pointer_loss_cancels() {
        let mut feed = FrameFeed::default();
        let mut pan = horizontal();
        pan.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        pan.recognize(&feed.frame(InputPhase::Move, &[(30.0, 0.0)], 50), &[]);
        let out = pan.recognize(&feed.frame(InputPhase::Cancel, &[(30.0, 0.0)], 60), &[]);
        assert_eq!(pan.state(), RecognizerState::Cancelled);
        assert_eq!(names(&out), ["pan", "pancancel"]);
    }

    #[test]
    fn test_constrained_direction() {
        assert_eq!(constrained_direction(Direction::HORIZONTAL, 0.0, 9.0), (Direction::NONE, 0.0));
        assert_eq!(constrained_direction(Direction::LEFT, 5.0, -9.0), (Direction::RIGHT, 5.0));
        assert_eq!(constrained_direction(Direction::VERTICAL, 5.0, -9.0), (Direction::UP, 9.0));
    }

    #[test]
    fn test_touch_action_hint() {
        assert_eq!(directional_touch_action(Direction::ALL), TouchAction::NONE);
        assert_eq!(directional_touch_action(Direction::HORIZONTAL), TouchAction::PAN_Y);
        assert_eq!(directional_touch_action(Direction::UP), TouchAction::PAN_X);
    }
}
