//! Pointer-event adapter.
//!
//! Platforms that report one pointer per event (pointer events, mouse,
//! touch-per-contact) feed a [`PointerTracker`], which keeps the set of
//! active contacts and turns every event into a [`RawInput`] listing all of
//! them.

use crate::event::{InputPhase, PointerId, PointerSample, PointerType, RawInput};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// What happened to one pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerAction {
    /// Contact made or button pressed
    Down,
    /// Contact moved
    Move,
    /// Contact lifted or button released
    Up,
    /// Platform cancelled the contact
    Cancel,
}

impl PointerAction {
    /// Input phase this action maps to.
    #[must_use]
    pub const fn phase(self) -> InputPhase {
        match self {
            Self::Down => InputPhase::Start,
            Self::Move => InputPhase::Move,
            Self::Up => InputPhase::End,
            Self::Cancel => InputPhase::Cancel,
        }
    }
}

/// One single-pointer platform event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// What happened
    pub action: PointerAction,
    /// Pointer position
    pub sample: PointerSample,
    /// Device type
    pub pointer_type: PointerType,
    /// Pressed button; 0 is the primary button
    pub button: u8,
    /// Event time in milliseconds
    pub timestamp: u64,
    /// Element under the pointer, if known
    pub hit: Option<TargetId>,
}

impl PointerEvent {
    /// Create a primary-button touch event.
    #[must_use]
    pub const fn new(action: PointerAction, sample: PointerSample, timestamp: u64) -> Self {
        Self {
            action,
            sample,
            pointer_type: PointerType::Touch,
            button: 0,
            timestamp,
            hit: None,
        }
    }

    /// Set the device type.
    #[must_use]
    pub const fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    /// Set the pressed button.
    #[must_use]
    pub const fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    /// Set the hit target.
    #[must_use]
    pub const fn with_hit(mut self, hit: TargetId) -> Self {
        self.hit = Some(hit);
        self
    }
}

/// Active-contact store for single-pointer event sources.
///
/// Contacts are kept in press order. A non-primary mouse button never
/// registers a contact, so its moves and releases are ignored.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    active: Vec<PointerSample>,
}

impl PointerTracker {
    /// Create an empty tracker.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Number of active contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no contact is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active contacts in press order.
    #[must_use]
    pub fn active(&self) -> &[PointerSample] {
        &self.active
    }

    fn index_of(&self, id: PointerId) -> Option<usize> {
        self.active.iter().position(|p| p.id == id)
    }

    /// Fold one event into the store and build the raw input for it.
    ///
    /// Returns `None` for events about pointers the tracker does not hold.
    /// A lifted or cancelled pointer is listed in its own event and removed
    /// afterwards.
    pub fn feed(&mut self, event: &PointerEvent) -> Option<RawInput> {
        let id = event.sample.id;
        let index = match (event.action, self.index_of(id)) {
            (_, Some(index)) => index,
            (PointerAction::Down, None)
                if event.button == 0 || event.pointer_type.is_touch() =>
            {
                self.active.push(event.sample);
                self.active.len() - 1
            }
            _ => {
                trace!(pointer = id.0, action = ?event.action, "untracked pointer ignored");
                return None;
            }
        };
        self.active[index] = event.sample;

        let mut raw = RawInput::new(event.action.phase(), self.active.clone(), event.timestamp)
            .with_changed(vec![event.sample])
            .with_pointer_type(event.pointer_type);
        raw.hit = event.hit;

        if matches!(event.action, PointerAction::Up | PointerAction::Cancel) {
            self.active.remove(index);
        }
        Some(raw)
    }

    /// Forget every contact.
    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(action: PointerAction, id: u32, x: f32, t: u64) -> PointerEvent {
        PointerEvent::new(action, PointerSample::new(id, x, 0.0), t)
    }

    #[test]
    fn test_two_finger_lifecycle() {
        let mut tracker = PointerTracker::new();

        let raw = tracker.feed(&ev(PointerAction::Down, 1, 0.0, 0)).unwrap();
        assert_eq!(raw.phase, InputPhase::Start);
        assert_eq!(raw.pointers.len(), 1);

        let raw = tracker.feed(&ev(PointerAction::Down, 2, 50.0, 10)).unwrap();
        assert_eq!(raw.pointers.len(), 2);
        assert_eq!(raw.changed_pointers, vec![PointerSample::new(2, 50.0, 0.0)]);

        let raw = tracker.feed(&ev(PointerAction::Move, 1, 5.0, 20)).unwrap();
        assert_eq!(raw.phase, InputPhase::Move);
        assert_eq!(raw.pointers[0].x, 5.0);
        assert_eq!(raw.pointers[1].x, 50.0);

        let raw = tracker.feed(&ev(PointerAction::Up, 1, 5.0, 30)).unwrap();
        assert_eq!(raw.phase, InputPhase::End);
        assert_eq!(raw.pointers.len(), 2, "lifting pointer is still listed");
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.active()[0].id, PointerId(2));

        tracker.feed(&ev(PointerAction::Cancel, 2, 50.0, 40)).unwrap();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unknown_pointer_is_ignored() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.feed(&ev(PointerAction::Move, 9, 0.0, 0)).is_none());
        assert!(tracker.feed(&ev(PointerAction::Up, 9, 0.0, 5)).is_none());
    }

    #[test]
    fn test_secondary_mouse_button_not_tracked() {
        let mut tracker = PointerTracker::new();
        let right_click = ev(PointerAction::Down, 1, 0.0, 0)
            .with_pointer_type(PointerType::Mouse)
            .with_button(2);
        assert!(tracker.feed(&right_click).is_none());
        assert!(tracker.is_empty());

        let left_click = right_click.with_button(0);
        let raw = tracker.feed(&left_click).unwrap();
        assert_eq!(raw.pointer_type, PointerType::Mouse);
    }

    #[test]
    fn test_touch_ignores_button() {
        let mut tracker = PointerTracker::new();
        let touch = ev(PointerAction::Down, 1, 0.0, 0)
            .with_button(1)
            .with_hit(TargetId(4));
        let raw = tracker.feed(&touch).unwrap();
        assert_eq!(raw.hit, Some(TargetId(4)));
    }
}
