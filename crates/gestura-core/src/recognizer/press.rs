//! Press: pointers held still for a minimum time.
//!
//! Recognition is timer driven. A START arms a timer for `time` ms; any
//! frame with too much movement or the wrong pointer count cancels it.
//! Releasing after the time has passed resolves synchronously as `pressup`.

use super::{Gesture, GestureEvent, ProcessContext, RecognizerState, Trigger};
use crate::event::InputPhase;
use crate::input::InputFrame;
use crate::timer::TimerAction;
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};

/// Press options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressOptions {
    /// Base event name
    pub event: String,
    /// Required pointer count
    pub pointers: usize,
    /// Minimum hold time in milliseconds
    pub time: u64,
    /// Maximum travel in pixels while held
    pub threshold: f32,
    /// Static enable flag
    pub enable: bool,
}

impl Default for PressOptions {
    fn default() -> Self {
        Self {
            event: "press".to_string(),
            pointers: 1,
            time: 500,
            threshold: 5.0,
            enable: true,
        }
    }
}

/// Press pattern state.
#[derive(Debug, Clone, Default)]
pub struct Press {
    /// Options, mutable between frames
    pub options: PressOptions,
    last_input: Option<InputFrame>,
}

impl Press {
    /// Create a press pattern.
    #[must_use]
    pub const fn new(options: PressOptions) -> Self {
        Self {
            options,
            last_input: None,
        }
    }
}

impl Gesture for Press {
    fn event(&self) -> &str {
        &self.options.event
    }

    fn enabled(&self) -> bool {
        self.options.enable
    }

    fn touch_action(&self) -> TouchAction {
        TouchAction::AUTO
    }

    fn process(&mut self, frame: &mut InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState {
        let valid_pointers = frame.pointer_count() == self.options.pointers;
        let valid_movement = frame.distance < self.options.threshold;
        let valid_time = frame.delta_time >= self.options.time;
        self.last_input = Some(frame.clone());

        if !valid_movement || !valid_pointers || (frame.phase.is_release() && !valid_time) {
            cx.timer.cancel();
        } else if frame.phase == InputPhase::Start {
            cx.timer.arm(
                frame.timestamp.saturating_add(self.options.time),
                TimerAction::Recognize,
            );
        } else if frame.phase == InputPhase::End {
            // a release on the deadline resolves here, before the timer fires
            cx.timer.cancel();
            return RecognizerState::RECOGNIZED;
        }
        RecognizerState::Failed
    }

    fn emit(&mut self, state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>) {
        if state != RecognizerState::RECOGNIZED {
            return;
        }
        match trigger {
            Trigger::Frame(frame) if frame.phase == InputPhase::End => {
                out.push(GestureEvent::new(
                    format!("{}up", self.options.event),
                    frame.clone(),
                ));
            }
            Trigger::Frame(_) | Trigger::Timer { .. } => {
                if let Some(mut input) = self.last_input.clone() {
                    if let Trigger::Timer { at } = trigger {
                        input.timestamp = at;
                    }
                    out.push(GestureEvent::new(self.options.event.clone(), input));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::test_support::FrameFeed;
    use crate::recognizer::Recognizer;

    fn names(events: &[GestureEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_type.as_str()).collect()
    }

    #[test]
    fn test_hold_then_release() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());

        press.recognize(&feed.frame(InputPhase::Start, &[(10.0, 10.0)], 0), &[]);
        assert_eq!(press.state(), RecognizerState::Failed);
        assert_eq!(press.pending_deadline(), Some(500));

        assert!(press.fire_timer(499, &[]).is_empty());
        let out = press.fire_timer(500, &[]);
        assert_eq!(names(&out), ["press"]);
        assert_eq!(out[0].frame.timestamp, 500);
        assert_eq!(press.state(), RecognizerState::RECOGNIZED);

        let out = press.recognize(&feed.frame(InputPhase::End, &[(11.0, 10.0)], 650), &[]);
        assert_eq!(press.state(), RecognizerState::RECOGNIZED);
        assert_eq!(names(&out), ["pressup"]);
    }

    #[test]
    fn test_movement_cancels_timer() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());

        press.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        press.recognize(&feed.frame(InputPhase::Move, &[(8.0, 0.0)], 100), &[]);
        assert!(press.pending_deadline().is_none());
        assert!(press.fire_timer(10_000, &[]).is_empty());
        assert_eq!(press.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_quick_release_fails() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());

        press.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        let out = press.recognize(&feed.frame(InputPhase::End, &[(0.0, 0.0)], 200), &[]);
        assert!(out.is_empty());
        assert_eq!(press.state(), RecognizerState::Failed);
        assert!(press.pending_deadline().is_none());
    }

    #[test]
    fn test_press_release_at_threshold_emits_pressup() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());

        press.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        let out = press.recognize(&feed.frame(InputPhase::End, &[(0.0, 0.0)], 500), &[]);
        assert_eq!(names(&out), ["pressup"]);
        assert_eq!(press.state(), RecognizerState::RECOGNIZED);
        assert!(press.pending_deadline().is_none());
        assert!(press.fire_timer(500, &[]).is_empty());
    }

    #[test]
    fn test_release_just_short_fails() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());

        press.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        let out = press.recognize(&feed.frame(InputPhase::End, &[(0.0, 0.0)], 499), &[]);
        assert!(out.is_empty());
        assert_eq!(press.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_reset_cancels_timer() {
        let mut feed = FrameFeed::default();
        let mut press = Recognizer::new(PressOptions::default());
        press.recognize(&feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0), &[]);
        press.reset();
        assert!(press.fire_timer(600, &[]).is_empty());
    }
}
