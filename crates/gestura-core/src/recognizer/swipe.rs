//! Swipe: a fast flick, decided entirely at release.

use super::attr;
use super::pan::directional_touch_action;
use super::{Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::event::InputPhase;
use crate::input::InputFrame;
use crate::kinematics::Direction;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Swipe options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count, `0` for any
    pub pointers: usize,
    /// Minimum travel in pixels, `0` to decide on velocity alone
    pub threshold: f32,
    /// Minimum release velocity in px/ms
    pub velocity: f32,
    /// Allowed directions
    pub direction: Direction,
    /// Static enable flag
    pub enable: bool,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self {
            event: "swipe".to_string(),
            pointers: 1,
            threshold: 0.0,
            velocity: 0.65,
            direction: Direction::HORIZONTAL | Direction::VERTICAL,
            enable: true,
        }
    }
}

/// Swipe pattern.
#[derive(Debug, Clone, Default)]
pub struct Swipe {
    /// Options, mutable between frames
    pub options: SwipeOptions,
}

impl Swipe {
    /// Create a swipe pattern.
    #[must_use]
    pub const fn new(options: SwipeOptions) -> Self {
        Self { options }
    }

    /// Velocity component measured against the threshold.
    ///
    /// A mask spanning both axes uses the dominant component; a single-axis
    /// mask uses that axis only.
    fn relevant_velocity(&self, frame: &InputFrame) -> f32 {
        let allowed = self.options.direction;
        let horizontal = allowed.intersects(Direction::HORIZONTAL);
        let vertical = allowed.intersects(Direction::VERTICAL);
        match (horizontal, vertical) {
            (true, false) => frame.velocity_x,
            (false, true) => frame.velocity_y,
            _ => frame.velocity,
        }
    }
}

impl Gesture for Swipe {
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
            && self.options.direction.intersects(frame.direction)
            && (self.options.threshold <= 0.0 || frame.distance > self.options.threshold)
            && self.relevant_velocity(frame).abs() > self.options.velocity
            && frame.phase == InputPhase::End;
        attr::transition(cx.state, frame.phase, passes)
    }

    fn emit(&mut self, _state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        let Trigger::Frame(frame) = trigger else {
            return;
        };
        if let Some(suffix) = frame.direction.suffix() {
            out.push(GestureEvent::new(
                format!("{}{suffix}", self.options.event),
                frame.clone(),
            ));
        }
        out.push(GestureEvent::new(self.options.event.clone(), frame.clone()));
    }
}
