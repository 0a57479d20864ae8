//! Per-sequence memory shared by the normalizer and the manager.

use crate::event::InputPhase;
use crate::geometry::Point;
use crate::kinematics::{self, Direction, Velocity};
use crate::recognizer::RecognizerId;

/// Whether recognition was stopped for the rest of the current sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopState {
    /// Recognition runs normally
    #[default]
    Running,
    /// Recognition skipped; default-action handling left to the caller
    Soft,
    /// Recognition skipped and every recognizer reset
    Forced,
}

impl StopState {
    /// Whether any kind of stop is in effect.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Pointer snapshot taken at a sequence landmark.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Baseline {
    pub(crate) timestamp: u64,
    pub(crate) pointers: Vec<Point>,
    pub(crate) center: Point,
}

impl Baseline {
    pub(crate) fn capture(positions: &[Point], timestamp: u64) -> Self {
        let pointers: Vec<Point> = positions.iter().map(Point::round_half_up).collect();
        let center = kinematics::center(&pointers);
        Self {
            timestamp,
            pointers,
            center,
        }
    }
}

/// The parts of the previous frame the normalizer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrevInput {
    pub(crate) phase: InputPhase,
    pub(crate) delta_x: f32,
    pub(crate) delta_y: f32,
}

/// Last resampled velocity snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IntervalSample {
    pub(crate) timestamp: u64,
    pub(crate) delta_x: f32,
    pub(crate) delta_y: f32,
    pub(crate) velocity: Velocity,
    pub(crate) direction: Direction,
}

/// Ephemeral memory for one gesture sequence.
///
/// A sequence runs from the first pointer down to the last pointer up. The
/// session is replaced by an empty one, with a bumped generation, when the
/// next sequence starts.
#[derive(Debug, Clone, Default)]
pub struct Session {
    generation: u64,
    pub(crate) first_input: Option<Baseline>,
    pub(crate) first_multiple: Option<Baseline>,
    pub(crate) prev_input: Option<PrevInput>,
    pub(crate) prev_delta: Point,
    pub(crate) offset_delta: Option<Point>,
    pub(crate) last_interval: Option<IntervalSample>,
    pub(crate) cur_recognizer: Option<RecognizerId>,
    pub(crate) stopped: StopState,
    pub(crate) prevented: bool,
}

impl Session {
    /// Create an empty session at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence counter, bumped on every reset.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Recognizer currently owning the sequence.
    #[must_use]
    pub const fn current_recognizer(&self) -> Option<RecognizerId> {
        self.cur_recognizer
    }

    /// Stop state for this sequence.
    #[must_use]
    pub const fn stopped(&self) -> StopState {
        self.stopped
    }

    /// Whether the platform default was already suppressed this sequence.
    #[must_use]
    pub const fn prevented(&self) -> bool {
        self.prevented
    }

    /// Discard all sequence memory and advance the generation.
    pub fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self {
            generation,
            ..Self::default()
        };
    }
}
