//! Cancellable delayed actions owned by a single recognizer.
//!
//! The engine never reads a clock. A timer is a deadline in the same
//! millisecond timebase as input timestamps; the manager fires it when the
//! host advances time past that deadline.

use tracing::trace;

/// What happens when a pending timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Mark the recognizer recognized and try to emit
    Recognize,
    /// Mark the recognizer failed without emitting
    Fail,
}

/// A scheduled action, tagged with the slot generation that armed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    /// Fire time in milliseconds
    pub deadline: u64,
    /// Action to run
    pub action: TimerAction,
    generation: u64,
}

/// Holds at most one pending timer.
///
/// Every cancellation advances the generation, so a timer armed before a
/// reset can never be confused with one armed after it.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    pending: Option<PendingTimer>,
    generation: u64,
}

impl TimerSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending timer with one firing at `deadline`.
    pub fn arm(&mut self, deadline: u64, action: TimerAction) {
        self.cancel();
        trace!(deadline, ?action, generation = self.generation, "timer armed");
        self.pending = Some(PendingTimer {
            deadline,
            action,
            generation: self.generation,
        });
    }

    /// Drop the pending timer, if any, and advance the generation.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            trace!(deadline = timer.deadline, "timer cancelled");
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Deadline of the pending timer.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.pending.map(|t| t.deadline)
    }

    /// Pending timer, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingTimer> {
        self.pending
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Take the pending timer if it is due at `now` and still current.
    pub fn take_due(&mut self, now: u64) -> Option<PendingTimer> {
        let timer = self.pending.filter(|t| t.deadline <= now)?;
        self.pending = None;
        if timer.generation != self.generation {
            trace!(deadline = timer.deadline, "stale timer dropped");
            return None;
        }
        trace!(deadline = timer.deadline, action = ?timer.action, "timer fired");
        Some(timer)
    }
}
