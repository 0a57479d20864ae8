//! Raw input types delivered by an event-source adapter.

use crate::geometry::Point;
use crate::target::TargetId;
use serde::{Deserialize, Serialize};

/// Pointer identifier, stable for the lifetime of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PointerId(pub u32);

impl PointerId {
    /// Create a new pointer ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Type of pointer device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    /// Touch contact
    #[default]
    Touch,
    /// Pen/stylus
    Pen,
    /// Mouse pointer
    Mouse,
    /// Depth-camera skeleton tracking
    Kinect,
}

impl PointerType {
    /// Check if this is a mouse pointer.
    #[must_use]
    pub const fn is_mouse(&self) -> bool {
        matches!(self, Self::Mouse)
    }

    /// Check if this is a touch pointer.
    #[must_use]
    pub const fn is_touch(&self) -> bool {
        matches!(self, Self::Touch)
    }

    /// Check if this is a pen pointer.
    #[must_use]
    pub const fn is_pen(&self) -> bool {
        matches!(self, Self::Pen)
    }
}

/// Phase of a raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPhase {
    /// A pointer went down
    Start,
    /// One or more pointers moved
    Move,
    /// A pointer lifted
    End,
    /// The platform cancelled a pointer
    Cancel,
}

impl InputPhase {
    /// `End` or `Cancel`.
    #[must_use]
    pub const fn is_release(&self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

/// Canonical coordinates of one contact at the moment of an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Pointer ID
    pub id: PointerId,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl PointerSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id: PointerId(id),
            x,
            y,
        }
    }

    /// Sample position as a point.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One platform event, already adapted by the source.
///
/// `pointers` lists every active contact including the ones in
/// `changed_pointers`; a lifting pointer is still present in its own END event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    /// Event phase
    pub phase: InputPhase,
    /// All active pointers
    pub pointers: Vec<PointerSample>,
    /// Pointers that changed in this event
    pub changed_pointers: Vec<PointerSample>,
    /// Device type
    pub pointer_type: PointerType,
    /// Event time in milliseconds, from the source's monotonic clock
    pub timestamp: u64,
    /// Element originally hit by the event, if known
    #[serde(default)]
    pub hit: Option<TargetId>,
}

impl RawInput {
    /// Event where every active pointer changed (the single-pointer case).
    #[must_use]
    pub fn new(phase: InputPhase, pointers: Vec<PointerSample>, timestamp: u64) -> Self {
        Self {
            phase,
            changed_pointers: pointers.clone(),
            pointers,
            pointer_type: PointerType::Touch,
            timestamp,
            hit: None,
        }
    }

    /// Set the changed subset.
    #[must_use]
    pub fn with_changed(mut self, changed: Vec<PointerSample>) -> Self {
        self.changed_pointers = changed;
        self
    }

    /// Set the pointer type.
    #[must_use]
    pub const fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    /// Set the hit target.
    #[must_use]
    pub const fn with_hit(mut self, hit: TargetId) -> Self {
        self.hit = Some(hit);
        self
    }
}

/// Default-action suppression hook on the platform event.
pub trait SourceEvent {
    /// Suppress the platform's default handling of this event.
    fn prevent_default(&mut self);
}

/// Source handle for events that have no platform counterpart.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSource;

impl SourceEvent for NoSource {
    fn prevent_default(&mut self) {}
}

/// Source handle that records whether default was prevented.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPrevented(pub bool);

impl SourceEvent for DefaultPrevented {
    fn prevent_default(&mut self) {
        self.0 = true;
    }
}
