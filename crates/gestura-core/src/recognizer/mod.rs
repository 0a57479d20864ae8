//! Recognizer state machine and the six gesture kinds.
//!
//! A [`Recognizer`] owns the state shared by every kind (lifecycle state,
//! relations, the pending timer, the enable predicate) and delegates the
//! pattern-specific transition and emission to its [`RecognizerKind`].

mod attr;
mod pan;
mod pinch;
mod press;
mod rotate;
mod swipe;
mod tap;

pub use pan::{constrained_direction, Pan, PanOptions};
pub use pinch::{Pinch, PinchOptions};
pub use press::{Press, PressOptions};
pub use rotate::{Rotate, RotateOptions};
pub use swipe::{Swipe, SwipeOptions};
pub use tap::{Tap, TapOptions};

use crate::input::InputFrame;
use crate::timer::{PendingTimer, TimerAction, TimerSlot};
use crate::touch_action::TouchAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Manager-scoped recognizer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct RecognizerId(pub u32);

impl fmt::Display for RecognizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerState {
    /// Waiting for input that matches
    #[default]
    Possible,
    /// Matched for the first time in this sequence
    Began,
    /// Still matching after having begun
    Changed,
    /// Finished successfully (also "recognized")
    Ended,
    /// Stopped matching after having begun
    Cancelled,
    /// Did not match
    Failed,
}

impl RecognizerState {
    /// Discrete gestures resolve straight to this state.
    pub const RECOGNIZED: Self = Self::Ended;

    /// `Ended`, `Cancelled` or `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled | Self::Failed)
    }

    /// `Began` or `Changed`.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// States that claim ownership of a sequence.
    #[must_use]
    pub const fn holds_sequence(self) -> bool {
        matches!(self, Self::Began | Self::Changed | Self::Ended)
    }

    /// States that trigger an emission attempt.
    #[must_use]
    pub const fn emits(self) -> bool {
        matches!(self, Self::Began | Self::Changed | Self::Ended | Self::Cancelled)
    }

    /// States that let a peer requiring this one's failure emit.
    #[must_use]
    pub const fn releases_peers(self) -> bool {
        matches!(self, Self::Possible | Self::Failed)
    }

    /// Lifecycle suffix appended to the event name.
    #[must_use]
    pub const fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Began => Some("start"),
            Self::Changed => Some("move"),
            Self::Ended => Some("end"),
            Self::Cancelled => Some("cancel"),
            Self::Possible | Self::Failed => None,
        }
    }
}

/// A named gesture delivered to handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    /// Event name the handler was registered under
    pub event_type: String,
    /// Frame that produced the gesture
    pub frame: InputFrame,
    /// Consecutive tap count, set on tap gestures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_count: Option<u32>,
}

impl GestureEvent {
    /// Create an event without tap data.
    #[must_use]
    pub fn new(event_type: impl Into<String>, frame: InputFrame) -> Self {
        Self {
            event_type: event_type.into(),
            frame,
            tap_count: None,
        }
    }
}

/// What caused an emission attempt.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Trigger<'a> {
    /// A frame passed through `recognize`
    Frame(&'a InputFrame),
    /// A pending timer fired at the given time
    Timer { at: u64 },
}

/// Mutable view of the shared state a kind may touch during `process`.
pub(crate) struct ProcessContext<'a> {
    pub(crate) state: RecognizerState,
    pub(crate) has_require_failures: bool,
    pub(crate) timer: &'a mut TimerSlot,
}

/// Pattern-specific behaviour behind a recognizer.
pub(crate) trait Gesture {
    /// Base event name.
    fn event(&self) -> &str;

    /// Static enable flag from the options.
    fn enabled(&self) -> bool;

    /// Native behaviour this gesture conflicts with.
    fn touch_action(&self) -> TouchAction;

    /// Candidate next state for `frame`.
    fn process(&mut self, frame: &mut InputFrame, cx: &mut ProcessContext<'_>) -> RecognizerState;

    /// Push the events for a successful emission attempt.
    fn emit(&mut self, state: RecognizerState, trigger: Trigger<'_>, out: &mut Vec<GestureEvent>);

    /// Clear per-sequence bookkeeping.
    fn reset(&mut self) {}
}

/// Emit `event` and its lifecycle-suffixed variant in state order.
///
/// Before the gesture ends the suffixed name goes first; once ended or
/// cancelled the bare name goes first.
pub(crate) fn emit_lifecycle(
    event: &str,
    state: RecognizerState,
    frame: &InputFrame,
    out: &mut Vec<GestureEvent>,
) {
    let suffixed = state
        .suffix()
        .map(|suffix| GestureEvent::new(format!("{event}{suffix}"), frame.clone()));
    let bare = GestureEvent::new(event, frame.clone());
    if state.is_active() {
        out.extend(suffixed);
        out.push(bare);
    } else {
        out.push(bare);
        out.extend(suffixed);
    }
}

/// The closed set of gesture kinds.
#[derive(Debug, Clone)]
pub enum RecognizerKind {
    /// Single or multi-pointer drag
    Pan(Pan),
    /// Two-pointer scale
    Pinch(Pinch),
    /// Two-pointer rotation
    Rotate(Rotate),
    /// Fast directional flick
    Swipe(Swipe),
    /// Long press
    Press(Press),
    /// Single or multi tap
    Tap(Tap),
}

impl RecognizerKind {
    /// Short kind name (`"pan"`, `"tap"`, ...).
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Pan(_) => "pan",
            Self::Pinch(_) => "pinch",
            Self::Rotate(_) => "rotate",
            Self::Swipe(_) => "swipe",
            Self::Press(_) => "press",
            Self::Tap(_) => "tap",
        }
    }

    fn gesture(&self) -> &dyn Gesture {
        match self {
            Self::Pan(g) => g,
            Self::Pinch(g) => g,
            Self::Rotate(g) => g,
            Self::Swipe(g) => g,
            Self::Press(g) => g,
            Self::Tap(g) => g,
        }
    }

    fn gesture_mut(&mut self) -> &mut dyn Gesture {
        match self {
            Self::Pan(g) => g,
            Self::Pinch(g) => g,
            Self::Rotate(g) => g,
            Self::Swipe(g) => g,
            Self::Press(g) => g,
            Self::Tap(g) => g,
        }
    }
}

macro_rules! kind_from {
    ($($options:ty => $variant:ident($pattern:ident)),* $(,)?) => {
        $(
            impl From<$options> for RecognizerKind {
                fn from(options: $options) -> Self {
                    Self::$variant($pattern::new(options))
                }
            }

            impl From<$pattern> for RecognizerKind {
                fn from(pattern: $pattern) -> Self {
                    Self::$variant(pattern)
                }
            }
        )*
    };
}

kind_from! {
    PanOptions => Pan(Pan),
    PinchOptions => Pinch(Pinch),
    RotateOptions => Rotate(Rotate),
    SwipeOptions => Swipe(Swipe),
    PressOptions => Press(Press),
    TapOptions => Tap(Tap),
}

type EnablePredicate = Box<dyn Fn(&InputFrame) -> bool>;

/// One gesture state machine.
pub struct Recognizer {
    id: RecognizerId,
    state: RecognizerState,
    kind: RecognizerKind,
    simultaneous: BTreeSet<RecognizerId>,
    require_fail: Vec<RecognizerId>,
    timer: TimerSlot,
    enable_when: Option<EnablePredicate>,
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("id", &self.id)
            .field("event", &self.event())
            .field("state", &self.state)
            .field("simultaneous", &self.simultaneous)
            .field("require_fail", &self.require_fail)
            .field("timer", &self.timer.pending())
            .field("enable_when", &self.enable_when.is_some())
            .finish_non_exhaustive()
    }
}

impl Recognizer {
    /// Create a recognizer from a kind or its options.
    ///
    /// The id is assigned when the recognizer is added to a manager.
    #[must_use]
    pub fn new(kind: impl Into<RecognizerKind>) -> Self {
        Self {
            id: RecognizerId::default(),
            state: RecognizerState::Possible,
            kind: kind.into(),
            simultaneous: BTreeSet::new(),
            require_fail: Vec::new(),
            timer: TimerSlot::new(),
            enable_when: None,
        }
    }

    /// Identifier within the owning manager.
    #[must_use]
    pub const fn id(&self) -> RecognizerId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: RecognizerId) {
        self.id = id;
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RecognizerState {
        self.state
    }

    /// Base event name.
    #[must_use]
    pub fn event(&self) -> &str {
        self.kind.gesture().event()
    }

    /// Gesture kind and its options.
    #[must_use]
    pub const fn kind(&self) -> &RecognizerKind {
        &self.kind
    }

    /// Mutable gesture kind; option changes apply from the next frame.
    pub fn kind_mut(&mut self) -> &mut RecognizerKind {
        &mut self.kind
    }

    /// Static enable flag from the options.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.kind.gesture().enabled()
    }

    /// Gate recognition on a per-frame predicate, in addition to the
    /// static flag.
    pub fn set_enable_when(&mut self, predicate: impl Fn(&InputFrame) -> bool + 'static) {
        self.enable_when = Some(Box::new(predicate));
    }

    /// Remove the per-frame predicate.
    pub fn clear_enable_when(&mut self) {
        self.enable_when = None;
    }

    fn enabled_for(&self, frame: &InputFrame) -> bool {
        self.is_enabled() && self.enable_when.as_ref().map_or(true, |f| f(frame))
    }

    /// Touch-action hint for this kind.
    #[must_use]
    pub fn touch_action(&self) -> TouchAction {
        self.kind.gesture().touch_action()
    }

    /// Whether this recognizer may hold a sequence together with `other`.
    #[must_use]
    pub fn can_recognize_with(&self, other: RecognizerId) -> bool {
        self.simultaneous.contains(&other)
    }

    /// Simultaneous peers.
    #[must_use]
    pub const fn simultaneous(&self) -> &BTreeSet<RecognizerId> {
        &self.simultaneous
    }

    /// Peers that must fail before this recognizer may emit, in order.
    #[must_use]
    pub fn require_failures(&self) -> &[RecognizerId] {
        &self.require_fail
    }

    /// Whether any require-failure peer is registered.
    #[must_use]
    pub fn has_require_failures(&self) -> bool {
        !self.require_fail.is_empty()
    }

    /// Deadline of the pending timer.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    pub(crate) fn add_simultaneous(&mut self, other: RecognizerId) -> bool {
        self.simultaneous.insert(other)
    }

    pub(crate) fn remove_simultaneous(&mut self, other: RecognizerId) -> bool {
        self.simultaneous.remove(&other)
    }

    pub(crate) fn add_require_failure(&mut self, other: RecognizerId) -> bool {
        if self.require_fail.contains(&other) {
            return false;
        }
        self.require_fail.push(other);
        true
    }

    pub(crate) fn remove_require_failure(&mut self, other: RecognizerId) -> bool {
        let before = self.require_fail.len();
        self.require_fail.retain(|id| *id != other);
        before != self.require_fail.len()
    }

    pub(crate) fn clear_relations(&mut self) {
        self.simultaneous.clear();
        self.require_fail.clear();
    }

    fn set_state(&mut self, next: RecognizerState) {
        if next != self.state {
            debug!(
                recognizer = %self.event(),
                from = ?self.state,
                to = ?next,
                "state transition"
            );
            self.state = next;
        }
    }

    /// Cancel the pending timer and clear per-sequence bookkeeping.
    ///
    /// The lifecycle state is left as is; it returns to `Possible` on the
    /// next evaluated frame.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.kind.gesture_mut().reset();
    }

    /// Evaluate one frame.
    ///
    /// `peers` holds the current state of every recognizer in the manager
    /// and gates emission on the require-failure peers.
    pub(crate) fn recognize(
        &mut self,
        frame: &InputFrame,
        peers: &[(RecognizerId, RecognizerState)],
    ) -> Vec<GestureEvent> {
        let mut frame = frame.clone();
        if !self.enabled_for(&frame) {
            self.reset();
            self.set_state(RecognizerState::Failed);
            return Vec::new();
        }
        if self.state.is_terminal() {
            self.state = RecognizerState::Possible;
        }

        let mut cx = ProcessContext {
            state: self.state,
            has_require_failures: self.has_require_failures(),
            timer: &mut self.timer,
        };
        let next = self.kind.gesture_mut().process(&mut frame, &mut cx);
        self.set_state(next);

        if next.emits() {
            self.try_emit(Trigger::Frame(&frame), peers)
        } else {
            Vec::new()
        }
    }

    /// Fire the pending timer if it is due at `now`.
    pub(crate) fn fire_timer(
        &mut self,
        now: u64,
        peers: &[(RecognizerId, RecognizerState)],
    ) -> Vec<GestureEvent> {
        let Some(PendingTimer { deadline, action, .. }) = self.timer.take_due(now) else {
            return Vec::new();
        };
        match action {
            TimerAction::Fail => {
                self.set_state(RecognizerState::Failed);
                Vec::new()
            }
            TimerAction::Recognize => {
                self.set_state(RecognizerState::RECOGNIZED);
                self.try_emit(Trigger::Timer { at: deadline }, peers)
            }
        }
    }

    fn can_emit(&self, peers: &[(RecognizerId, RecognizerState)]) -> bool {
        self.require_fail.iter().all(|required| {
            peers
                .iter()
                .find(|(id, _)| id == required)
                .map_or(true, |(_, state)| state.releases_peers())
        })
    }

    fn try_emit(
        &mut self,
        trigger: Trigger<'_>,
        peers: &[(RecognizerId, RecognizerState)],
    ) -> Vec<GestureEvent> {
        if !self.can_emit(peers) {
            debug!(recognizer = %self.event(), "blocked by require-failure peer");
            self.set_state(RecognizerState::Failed);
            return Vec::new();
        }
        let mut out = Vec::new();
        self.kind.gesture_mut().emit(self.state, trigger, &mut out);
        out
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::event::{InputPhase, PointerSample, RawInput};
    use crate::input::{self, InputFrame};
    use crate::session::Session;
    use crate::target::TargetId;

    /// Feeds raw events through a private session.
    #[derive(Default)]
    pub(crate) struct FrameFeed {
        session: Session,
    }

    impl FrameFeed {
        pub(crate) fn frame(&mut self, phase: InputPhase, points: &[(f32, f32)], t: u64) -> InputFrame {
            let pointers = points
                .iter()
                .enumerate()
                .map(|(i, (x, y))| PointerSample::new(i as u32, *x, *y))
                .collect();
            let raw = RawInput::new(phase, pointers, t);
            let frame = input::normalize(&mut self.session, &raw, TargetId(0));
            input::record_prev(&mut self.session, &frame);
            frame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FrameFeed;
    use super::*;
    use crate::event::InputPhase;

    fn names(events: &[GestureEvent]) -> Vec<&str> {
        events.iter().map(|e| e.event_type.as_str()).collect()
    }

    #[test]
    fn test_state_predicates() {
        assert!(RecognizerState::Failed.is_terminal());
        assert!(!RecognizerState::Changed.is_terminal());
        assert!(RecognizerState::Ended.holds_sequence());
        assert!(!RecognizerState::Cancelled.holds_sequence());
        assert!(RecognizerState::Cancelled.emits());
        assert!(!RecognizerState::Possible.emits());
        assert_eq!(RecognizerState::RECOGNIZED, RecognizerState::Ended);
        assert_eq!(RecognizerState::Changed.suffix(), Some("move"));
        assert_eq!(RecognizerState::Failed.suffix(), None);
    }

    #[test]
    fn test_lifecycle_emit_order() {
        let mut feed = FrameFeed::default();
        let frame = feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0);

        let mut out = Vec::new();
        emit_lifecycle("pan", RecognizerState::Began, &frame, &mut out);
        assert_eq!(names(&out), ["panstart", "pan"]);

        out.clear();
        emit_lifecycle("pan", RecognizerState::Ended, &frame, &mut out);
        assert_eq!(names(&out), ["pan", "panend"]);

        out.clear();
        emit_lifecycle("pan", RecognizerState::Cancelled, &frame, &mut out);
        assert_eq!(names(&out), ["pan", "pancancel"]);
    }

    #[test]
    fn test_disabled_recognizer_fails() {
        let mut feed = FrameFeed::default();
        let mut rec = Recognizer::new(PanOptions {
            enable: false,
            ..PanOptions::default()
        });
        let frame = feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0);
        assert!(rec.recognize(&frame, &[]).is_empty());
        assert_eq!(rec.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_enable_predicate() {
        let mut feed = FrameFeed::default();
        let mut rec = Recognizer::new(PanOptions::default());
        rec.set_enable_when(|frame| frame.center.x < 100.0);

        let start = feed.frame(InputPhase::Start, &[(200.0, 0.0)], 0);
        rec.recognize(&start, &[]);
        assert_eq!(rec.state(), RecognizerState::Failed);

        rec.clear_enable_when();
        let mv = feed.frame(InputPhase::Move, &[(240.0, 0.0)], 50);
        rec.recognize(&mv, &[]);
        assert_eq!(rec.state(), RecognizerState::Began);
    }

    #[test]
    fn test_require_failure_blocks_emit() {
        let mut feed = FrameFeed::default();
        let mut rec = Recognizer::new(PanOptions::default());
        let blocker = RecognizerId(9);
        rec.add_require_failure(blocker);
        assert!(!rec.add_require_failure(blocker));

        feed.frame(InputPhase::Start, &[(0.0, 0.0)], 0);
        let mv = feed.frame(InputPhase::Move, &[(40.0, 0.0)], 50);
        let out = rec.recognize(&mv, &[(blocker, RecognizerState::Began)]);
        assert!(out.is_empty());
        assert_eq!(rec.state(), RecognizerState::Failed);

        let mv = feed.frame(InputPhase::Move, &[(80.0, 0.0)], 100);
        let out = rec.recognize(&mv, &[(blocker, RecognizerState::Failed)]);
        assert_eq!(names(&out), ["panright", "panstart", "pan"]);
    }

    #[test]
    fn test_relation_bookkeeping() {
        let mut rec = Recognizer::new(TapOptions::default());
        assert!(rec.add_simultaneous(RecognizerId(2)));
        assert!(rec.can_recognize_with(RecognizerId(2)));
        assert!(rec.remove_simultaneous(RecognizerId(2)));
        assert!(!rec.can_recognize_with(RecognizerId(2)));

        rec.add_require_failure(RecognizerId(3));
        rec.add_require_failure(RecognizerId(4));
        assert_eq!(rec.require_failures(), [RecognizerId(3), RecognizerId(4)]);
        assert!(rec.remove_require_failure(RecognizerId(3)));
        assert!(!rec.remove_require_failure(RecognizerId(3)));
        assert_eq!(rec.require_failures(), [RecognizerId(4)]);
    }

    #[test]
    fn test_kind_from_options() {
        let rec = Recognizer::new(SwipeOptions::default());
        assert_eq!(rec.event(), "swipe");
        assert_eq!(rec.kind().kind_name(), "swipe");
        assert!(rec.is_enabled());
        assert_eq!(rec.state(), RecognizerState::Possible);
    }
}
