//! Input normalization: raw events in, canonical [`InputFrame`]s out.
//!
//! The normalizer is the only writer of the kinematic parts of the
//! [`Session`]. It establishes baselines at sequence start, keeps total
//! displacement continuous when pointers join or leave, and resamples
//! velocity at a fixed interval to damp jitter from high-frequency sources.

use crate::event::{InputPhase, PointerSample, PointerType, RawInput};
use crate::geometry::Point;
use crate::kinematics::{self, Direction, Velocity};
use crate::session::{Baseline, IntervalSample, PrevInput, Session};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Minimum elapsed milliseconds between two velocity resamples.
pub const COMPUTE_INTERVAL: u64 = 25;

/// A normalized snapshot of all active pointers plus computed kinematics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Event phase
    pub phase: InputPhase,
    /// All active pointers
    pub pointers: Vec<PointerSample>,
    /// Pointers that changed in this event
    pub changed_pointers: Vec<PointerSample>,
    /// Device type
    pub pointer_type: PointerType,
    /// Rounded center of the active pointers
    pub center: Point,
    /// Event time in milliseconds
    pub timestamp: u64,
    /// Milliseconds since the sequence started
    pub delta_time: u64,
    /// Total horizontal displacement in this sequence
    pub delta_x: f32,
    /// Total vertical displacement in this sequence
    pub delta_y: f32,
    /// Distance of the center from the offset baseline
    pub distance: f32,
    /// Angle in degrees of the center from the offset baseline
    pub angle: f32,
    /// Two-pointer scale relative to the multi-pointer baseline
    pub scale: f32,
    /// Two-pointer rotation in degrees relative to the multi-pointer baseline
    pub rotation: f32,
    /// Dominant velocity component in px/ms
    pub velocity: f32,
    /// Horizontal velocity in px/ms
    pub velocity_x: f32,
    /// Vertical velocity in px/ms
    pub velocity_y: f32,
    /// Direction of travel over the last resample interval
    pub direction: Direction,
    /// Direction of the total displacement
    pub offset_direction: Direction,
    /// First frame of a sequence
    pub is_first: bool,
    /// Last frame of a sequence
    pub is_final: bool,
    /// Resolved logical target
    pub target: TargetId,
}

impl InputFrame {
    /// Number of active pointers.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Active pointer positions.
    #[must_use]
    pub fn positions(&self) -> Vec<Point> {
        self.pointers.iter().map(PointerSample::position).collect()
    }
}

/// Produce the frame for `raw` and update `session` accordingly.
///
/// A START with no previously active pointers begins a new sequence and
/// resets the session before anything else is computed.
pub fn normalize(session: &mut Session, raw: &RawInput, target: TargetId) -> InputFrame {
    let settled = raw.pointers.len() == raw.changed_pointers.len();
    let is_first = raw.phase == InputPhase::Start && settled;
    let is_final = raw.phase.is_release() && settled;
    if is_first {
        session.reset();
    }

    let positions: Vec<Point> = raw.pointers.iter().map(PointerSample::position).collect();
    let timestamp = raw.timestamp;

    let first_input = session
        .first_input
        .get_or_insert_with(|| Baseline::capture(&positions, timestamp))
        .clone();
    if positions.len() > 1 && session.first_multiple.is_none() {
        session.first_multiple = Some(Baseline::capture(&positions, timestamp));
    } else if positions.len() == 1 {
        session.first_multiple = None;
    }

    let offset_center = session
        .first_multiple
        .as_ref()
        .map_or(first_input.center, |b| b.center);
    let center = kinematics::center(&positions);
    let (delta_x, delta_y) = compute_delta(session, raw.phase, center);
    let (scale, rotation) = session.first_multiple.as_ref().map_or((1.0, 0.0), |b| {
        (
            kinematics::scale(&b.pointers, &positions),
            kinematics::rotation(&b.pointers, &positions),
        )
    });

    let mut frame = InputFrame {
        phase: raw.phase,
        pointers: raw.pointers.clone(),
        changed_pointers: raw.changed_pointers.clone(),
        pointer_type: raw.pointer_type,
        center,
        timestamp,
        delta_time: timestamp.saturating_sub(first_input.timestamp),
        delta_x,
        delta_y,
        distance: kinematics::distance(offset_center, center),
        angle: kinematics::angle(offset_center, center),
        scale,
        rotation,
        velocity: 0.0,
        velocity_x: 0.0,
        velocity_y: 0.0,
        direction: Direction::NONE,
        offset_direction: kinematics::direction(delta_x, delta_y),
        is_first,
        is_final,
        target,
    };
    compute_interval(session, &mut frame);

    trace!(
        phase = ?frame.phase,
        pointers = frame.pointer_count(),
        delta_x = frame.delta_x,
        delta_y = frame.delta_y,
        velocity = frame.velocity,
        direction = ?frame.direction,
        "normalized frame"
    );
    frame
}

/// Record `frame` as the previous input once dispatch has finished.
pub fn record_prev(session: &mut Session, frame: &InputFrame) {
    session.prev_input = Some(PrevInput {
        phase: frame.phase,
        delta_x: frame.delta_x,
        delta_y: frame.delta_y,
    });
}

/// Total displacement, continuous across pointer-count changes.
///
/// The continuity baseline moves to the current center on START, or when the
/// previous frame was an END (a pointer lifted while others stay down); the
/// displacement accumulated so far carries over in `prev_delta`.
fn compute_delta(session: &mut Session, phase: InputPhase, center: Point) -> (f32, f32) {
    let prev = session.prev_input;
    let rebaseline = phase == InputPhase::Start
        || prev.is_some_and(|p| p.phase == InputPhase::End)
        || session.offset_delta.is_none();
    if rebaseline {
        session.prev_delta = prev.map_or(Point::ORIGIN, |p| Point::new(p.delta_x, p.delta_y));
        session.offset_delta = Some(center);
    }
    let offset = *session.offset_delta.get_or_insert(center);
    let prev_delta = session.prev_delta;
    (
        prev_delta.x + (center.x - offset.x),
        prev_delta.y + (center.y - offset.y),
    )
}

/// Resample velocity and direction, or carry the last sample forward.
fn compute_interval(session: &mut Session, frame: &mut InputFrame) {
    let resample = frame.phase != InputPhase::Cancel
        && session
            .last_interval
            .map_or(true, |last| frame.timestamp.saturating_sub(last.timestamp) > COMPUTE_INTERVAL);

    let sample = if resample {
        let last = session.last_interval.unwrap_or(IntervalSample {
            timestamp: frame.timestamp,
            delta_x: frame.delta_x,
            delta_y: frame.delta_y,
            velocity: Velocity::default(),
            direction: Direction::NONE,
        });
        let dt = frame.timestamp.saturating_sub(last.timestamp);
        let dx = frame.delta_x - last.delta_x;
        let dy = frame.delta_y - last.delta_y;
        let sample = IntervalSample {
            timestamp: frame.timestamp,
            delta_x: frame.delta_x,
            delta_y: frame.delta_y,
            velocity: kinematics::velocity(dt, dx, dy),
            direction: kinematics::direction(dx, dy),
        };
        session.last_interval = Some(sample);
        sample
    } else {
        session.last_interval.unwrap_or(IntervalSample {
            timestamp: frame.timestamp,
            delta_x: frame.delta_x,
            delta_y: frame.delta_y,
            velocity: Velocity::default(),
            direction: Direction::NONE,
        })
    };

    frame.velocity = sample.velocity.dominant();
    frame.velocity_x = sample.velocity.x;
    frame.velocity_y = sample.velocity.y;
    frame.direction = sample.direction;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerSample as P;

    fn run(session: &mut Session, raw: &RawInput) -> InputFrame {
        let frame = normalize(session, raw, TargetId(0));
        record_prev(session, &frame);
        frame
    }

    fn single(phase: InputPhase, x: f32, y: f32, t: u64) -> RawInput {
        RawInput::new(phase, vec![P::new(1, x, y)], t)
    }

    #[test]
    fn test_first_and_final_flags() {
        let mut s = Session::new();
        let start = run(&mut s, &single(InputPhase::Start, 0.0, 0.0, 0));
        assert!(start.is_first);
        assert!(!start.is_final);
        assert_eq!(s.generation(), 1);

        let mv = run(&mut s, &single(InputPhase::Move, 5.0, 0.0, 10));
        assert!(!mv.is_first && !mv.is_final);

        let end = run(&mut s, &single(InputPhase::End, 5.0, 0.0, 20));
        assert!(end.is_final);
    }

    #[test]
    fn test_single_pointer_delta_and_distance() {
        let mut s = Session::new();
        run(&mut s, &single(InputPhase::Start, 10.0, 10.0, 0));
        let f = run(&mut s, &single(InputPhase::Move, 40.0, 50.0, 100));
        assert_eq!(f.delta_x, 30.0);
        assert_eq!(f.delta_y, 40.0);
        assert!((f.distance - 50.0).abs() < 1e-4);
        assert_eq!(f.delta_time, 100);
        assert_eq!(f.offset_direction, Direction::DOWN);
        assert_eq!(f.scale, 1.0);
        assert_eq!(f.rotation, 0.0);
    }

    #[test]
    fn test_new_sequence_resets_session() {
        let mut s = Session::new();
        run(&mut s, &single(InputPhase::Start, 0.0, 0.0, 0));
        run(&mut s, &single(InputPhase::Move, 30.0, 0.0, 50));
        run(&mut s, &single(InputPhase::End, 30.0, 0.0, 100));

        let f = run(&mut s, &single(InputPhase::Start, 200.0, 200.0, 500));
        assert!(f.is_first);
        assert_eq!(f.delta_x, 0.0);
        assert_eq!(f.delta_time, 0);
        assert_eq!(s.generation(), 2);
    }

    #[test]
    fn test_delta_continuity_across_pointer_lift() {
        let mut s = Session::new();
        let two = |phase, x0: f32, x1: f32, t| {
            RawInput::new(phase, vec![P::new(1, x0, 0.0), P::new(2, x1, 0.0)], t)
        };
        run(&mut s, &single(InputPhase::Start, 0.0, 0.0, 0));
        // second finger joins: START with one changed pointer
        run(
            &mut s,
            &two(InputPhase::Start, 0.0, 100.0, 10).with_changed(vec![P::new(2, 100.0, 0.0)]),
        );
        let moved = run(&mut s, &two(InputPhase::Move, 20.0, 120.0, 50));
        assert_eq!(moved.delta_x, 20.0);

        // finger 2 lifts; its END still lists both pointers
        let lift = run(
            &mut s,
            &two(InputPhase::End, 20.0, 120.0, 60).with_changed(vec![P::new(2, 120.0, 0.0)]),
        );
        assert!(!lift.is_final);
        assert_eq!(lift.delta_x, 20.0);

        // remaining finger continues without a jump in total displacement
        let after = run(&mut s, &single(InputPhase::Move, 30.0, 0.0, 100));
        assert_eq!(after.delta_x, 20.0);
        let later = run(&mut s, &single(InputPhase::Move, 45.0, 0.0, 150));
        assert_eq!(later.delta_x, 35.0);
    }

    #[test]
    fn test_first_multiple_scale_and_clear() {
        let mut s = Session::new();
        let two = |phase, x1: f32, t| {
            RawInput::new(phase, vec![P::new(1, 0.0, 0.0), P::new(2, x1, 0.0)], t)
        };
        run(&mut s, &two(InputPhase::Start, 100.0, 0));
        let f = run(&mut s, &two(InputPhase::Move, 150.0, 50));
        assert!((f.scale - 1.5).abs() < 1e-5);
        assert!(f.rotation.abs() < 1e-4);
        assert!(s.first_multiple.is_some());

        run(&mut s, &single(InputPhase::Move, 0.0, 0.0, 80));
        assert!(s.first_multiple.is_none());
    }

    #[test]
    fn test_velocity_resampled_after_interval() {
        let mut s = Session::new();
        let start = run(&mut s, &single(InputPhase::Start, 0.0, 0.0, 0));
        assert_eq!(start.velocity, 0.0);
        assert_eq!(start.direction, Direction::NONE);

        let f = run(&mut s, &single(InputPhase::Move, 50.0, 0.0, 50));
        assert!((f.velocity_x - 1.0).abs() < 1e-6);
        assert!((f.velocity - 1.0).abs() < 1e-6);
        assert_eq!(f.direction, Direction::RIGHT);

        // within the interval: carried forward unchanged
        let f = run(&mut s, &single(InputPhase::Move, 20.0, 0.0, 60));
        assert!((f.velocity_x - 1.0).abs() < 1e-6);
        assert_eq!(f.direction, Direction::RIGHT);

        // past the interval: recomputed against the last resample
        let f = run(&mut s, &single(InputPhase::Move, 0.0, 0.0, 100));
        assert!((f.velocity_x + 1.0).abs() < 1e-6);
        assert_eq!(f.direction, Direction::LEFT);
    }

    #[test]
    fn test_cancel_carries_velocity() {
        let mut s = Session::new();
        run(&mut s, &single(InputPhase::Start, 0.0, 0.0, 0));
        run(&mut s, &single(InputPhase::Move, 0.0, 60.0, 30));
        let f = run(&mut s, &single(InputPhase::Cancel, 0.0, 0.0, 500));
        assert!((f.velocity_y - 2.0).abs() < 1e-6);
        assert_eq!(f.direction, Direction::DOWN);
        assert!(f.is_final);
    }

    #[test]
    fn test_move_without_start_is_tolerated() {
        let mut s = Session::new();
        let f = run(&mut s, &single(InputPhase::Move, 10.0, 10.0, 5));
        assert!(!f.is_first);
        assert_eq!(f.delta_x, 0.0);
        assert_eq!(f.distance, 0.0);
        assert!(f.velocity.is_finite());
    }
}
